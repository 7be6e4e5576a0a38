use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, NamedEntity};
use super::transaction::TransactionKind;

/// Pattern rule that assigns a category to matching transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    /// Case-insensitive regex matched against the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_pattern: Option<String>,
    /// Case-insensitive regex matched against the merchant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    /// Higher priority rules are consulted first.
    #[serde(default)]
    pub priority: i32,
    pub is_active: bool,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, category_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            name: name.into(),
            description_pattern: None,
            merchant_pattern: None,
            min_amount: None,
            max_amount: None,
            kind: None,
            priority: 0,
            is_active: true,
        }
    }

    pub fn with_description_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.description_pattern = Some(pattern.into());
        self
    }

    pub fn with_merchant_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.merchant_pattern = Some(pattern.into());
        self
    }

    pub fn with_amount_range(
        mut self,
        min_amount: Option<Decimal>,
        max_amount: Option<Decimal>,
    ) -> Self {
        self.min_amount = min_amount;
        self.max_amount = max_amount;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Identifiable for CategoryRule {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for CategoryRule {
    fn name(&self) -> &str {
        &self.name
    }
}
