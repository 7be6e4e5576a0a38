//! Profile domain models, persistence-friendly types, and helpers.

pub mod budget;
pub mod cadence;
pub mod category;
pub mod common;
pub mod debt;
pub mod insight;
pub mod profile;
pub mod rule;
pub mod transaction;

pub use budget::{Budget, BudgetAlert, BudgetPeriod};
pub use cadence::Cadence;
pub use category::Category;
pub use common::{Identifiable, NamedEntity};
pub use debt::{Debt, DebtKind, DebtPayment, DebtStatus};
pub use insight::{
    CashflowForecast, Insight, InsightKind, InsightSeverity, InsightStatus, ScheduledBill,
    SpendingAnomaly, SpendingForecast, TrendDirection,
};
pub use profile::{Profile, CURRENT_SCHEMA_VERSION};
pub use rule::CategoryRule;
pub use transaction::{Transaction, TransactionKind};
