use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    budget::Budget,
    category::Category,
    common::{find_by_id, find_by_id_mut},
    debt::Debt,
    insight::Insight,
    rule::CategoryRule,
    transaction::Transaction,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Aggregate root holding all finance data for one person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub rules: Vec<CategoryRule>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Profile::schema_version_default")]
    pub schema_version: u8,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            debts: Vec::new(),
            budgets: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            rules: Vec::new(),
            insights: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_debt(&mut self, debt: Debt) -> Uuid {
        let id = debt.id;
        self.debts.push(debt);
        self.touch();
        id
    }

    pub fn add_budget(&mut self, budget: Budget) -> Uuid {
        let id = budget.id;
        self.budgets.push(budget);
        self.touch();
        id
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn add_rule(&mut self, rule: CategoryRule) -> Uuid {
        let id = rule.id;
        self.rules.push(rule);
        self.touch();
        id
    }

    pub fn add_insight(&mut self, insight: Insight) -> Uuid {
        let id = insight.id;
        self.insights.push(insight);
        self.touch();
        id
    }

    pub fn debt(&self, id: Uuid) -> Option<&Debt> {
        find_by_id(&self.debts, id)
    }

    pub fn debt_mut(&mut self, id: Uuid) -> Option<&mut Debt> {
        find_by_id_mut(&mut self.debts, id)
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        find_by_id(&self.budgets, id)
    }

    pub fn budget_mut(&mut self, id: Uuid) -> Option<&mut Budget> {
        find_by_id_mut(&mut self.budgets, id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        find_by_id(&self.categories, id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        find_by_id_mut(&mut self.categories, id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        find_by_id(&self.transactions, id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        find_by_id_mut(&mut self.transactions, id)
    }

    pub fn rule(&self, id: Uuid) -> Option<&CategoryRule> {
        find_by_id(&self.rules, id)
    }

    pub fn rule_mut(&mut self, id: Uuid) -> Option<&mut CategoryRule> {
        find_by_id_mut(&mut self.rules, id)
    }

    pub fn insight(&self, id: Uuid) -> Option<&Insight> {
        find_by_id(&self.insights, id)
    }

    pub fn insight_mut(&mut self, id: Uuid) -> Option<&mut Insight> {
        find_by_id_mut(&mut self.insights, id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
