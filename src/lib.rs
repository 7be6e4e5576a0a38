#![doc(test(attr(deny(warnings))))]

//! DebtWise models personal finances end to end: debts and payoff plans,
//! budgets with rolling periods, categorized transactions, and predictive
//! insights derived from spending history.

pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("DebtWise tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
