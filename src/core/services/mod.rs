pub mod budget_service;
pub mod category_service;
pub mod debt_service;
pub mod insight_service;
pub mod rule_service;
pub mod transaction_service;

pub use budget_service::BudgetService;
pub use category_service::CategoryService;
pub use debt_service::DebtService;
pub use insight_service::InsightService;
pub use rule_service::RuleService;
pub use transaction_service::TransactionService;

use crate::core::errors::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(String),
}
