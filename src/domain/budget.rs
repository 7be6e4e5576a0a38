use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cadence::Cadence;
use super::common::{Identifiable, NamedEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scope of the budget; `None` tracks overall spending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    /// Base amount granted each period before rollover.
    pub amount: Decimal,
    pub cadence: Cadence,
    pub starts_on: NaiveDate,
    #[serde(default)]
    pub allow_rollover: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rollover_periods: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rollover_amount: Option<Decimal>,
    pub is_active: bool,
    #[serde(default)]
    pub periods: Vec<BudgetPeriod>,
    #[serde(default)]
    pub alerts: Vec<BudgetAlert>,
}

impl Budget {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        cadence: Cadence,
        starts_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            category_id: None,
            amount,
            cadence,
            starts_on,
            allow_rollover: false,
            max_rollover_periods: None,
            max_rollover_amount: None,
            is_active: true,
            periods: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_rollover(
        mut self,
        max_periods: Option<u32>,
        max_amount: Option<Decimal>,
    ) -> Self {
        self.allow_rollover = true;
        self.max_rollover_periods = max_periods;
        self.max_rollover_amount = max_amount;
        self
    }

    /// Most recent period by end date.
    pub fn latest_period(&self) -> Option<&BudgetPeriod> {
        self.periods.iter().max_by_key(|period| period.ends_on)
    }

    /// Period whose date range contains `date`.
    pub fn period_containing(&self, date: NaiveDate) -> Option<&BudgetPeriod> {
        self.periods
            .iter()
            .find(|period| period.contains(date))
    }

    pub fn period_containing_mut(&mut self, date: NaiveDate) -> Option<&mut BudgetPeriod> {
        self.periods
            .iter_mut()
            .find(|period| period.contains(date))
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Budget {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Materialized budget period with cached spending totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetPeriod {
    pub id: Uuid,
    pub starts_on: NaiveDate,
    /// Inclusive period end.
    pub ends_on: NaiveDate,
    pub base_amount: Decimal,
    pub rollover_amount: Decimal,
    pub total_amount: Decimal,
    pub spent_amount: Decimal,
    pub remaining_amount: Decimal,
    #[serde(default)]
    pub is_closed: bool,
}

impl BudgetPeriod {
    pub fn new(
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        base_amount: Decimal,
        rollover_amount: Decimal,
    ) -> Self {
        let total = base_amount + rollover_amount;
        Self {
            id: Uuid::new_v4(),
            starts_on,
            ends_on,
            base_amount,
            rollover_amount,
            total_amount: total,
            spent_amount: Decimal::ZERO,
            remaining_amount: total,
            is_closed: false,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.starts_on && date <= self.ends_on
    }

    /// Days in the period, counting both endpoints.
    pub fn length_days(&self) -> i64 {
        (self.ends_on - self.starts_on).num_days() + 1
    }
}

impl Identifiable for BudgetPeriod {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub id: Uuid,
    /// Fires once period usage reaches this percentage (1-100).
    pub threshold_percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub is_enabled: bool,
}

impl BudgetAlert {
    pub fn new(threshold_percent: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            threshold_percent,
            message: None,
            is_enabled: true,
        }
    }
}

impl Identifiable for BudgetAlert {
    fn id(&self) -> Uuid {
        self.id
    }
}
