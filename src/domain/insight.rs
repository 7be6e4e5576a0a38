//! Insight records and derived forecast types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::Identifiable;

/// Persisted insight produced by the insight generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub kind: InsightKind,
    pub severity: InsightSeverity,
    pub status: InsightStatus,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transaction_ids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        kind: InsightKind,
        severity: InsightSeverity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity,
            status: InsightStatus::Active,
            title: title.into(),
            description: description.into(),
            budget_id: None,
            transaction_ids: Vec::new(),
            recommendation: None,
            action_items: Vec::new(),
            potential_savings: None,
            risk_score: None,
            valid_until: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_action_items(mut self, items: Vec<String>) -> Self {
        self.action_items = items;
        self
    }

    pub fn with_potential_savings(mut self, savings: Decimal) -> Self {
        self.potential_savings = Some(savings);
        self
    }

    pub fn with_risk_score(mut self, risk: f64) -> Self {
        self.risk_score = Some(risk);
        self
    }

    pub fn with_valid_until(mut self, date: NaiveDate) -> Self {
        self.valid_until = Some(date);
        self
    }

    pub fn with_budget(mut self, budget_id: Uuid) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    pub fn with_transactions(mut self, ids: Vec<Uuid>) -> Self {
        self.transaction_ids = ids;
        self
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, InsightStatus::Active)
    }
}

impl Identifiable for Insight {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum InsightKind {
    SpendingForecast,
    CashflowForecast,
    BudgetProjection,
    AnomalyDetection,
    CategoryTrend,
    DebtPayoff,
    SavingsOpportunity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum InsightSeverity {
    Info,
    Success,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum InsightStatus {
    Active,
    Acknowledged,
    Resolved,
    Dismissed,
}

/// Predicted spending over a date window, derived on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingForecast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub predicted_amount: Decimal,
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
    /// 0.0 (no signal) to 1.0 (high confidence).
    pub confidence: f64,
    /// Mean amount of the historical transactions backing the forecast.
    pub historical_average: Decimal,
    pub trend: TrendDirection,
    pub trend_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Projected balance walk over a forecast horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowForecast {
    pub forecast_date: NaiveDate,
    pub current_balance: Decimal,
    pub projected_income: Decimal,
    pub projected_expenses: Decimal,
    pub projected_balance: Decimal,
    pub minimum_balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_balance_date: Option<NaiveDate>,
    /// 0.0 (safe) to 1.0 (projected overdraft).
    pub overdraft_risk: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scheduled_bills: Vec<ScheduledBill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledBill {
    pub description: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
}

/// Transaction flagged as unusual for its category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingAnomaly {
    pub transaction_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub occurred_on: NaiveDate,
    pub amount: Decimal,
    pub expected_min: Decimal,
    pub expected_max: Decimal,
    /// Z-score of the amount within its category sample.
    pub score: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
}
