//! Budget tracking built around materialized periods.
//!
//! Periods are created lazily: a budget starts with one period and grows new
//! ones as rollover processing or summary refreshes reach later dates. Spent
//! totals are cached on each period and recomputed from the transaction log.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cadence::shift_month;
use crate::domain::{Budget, BudgetAlert, BudgetPeriod, Cadence, Profile, Transaction};

use super::{ServiceError, ServiceResult};

/// Months of history behind the average-spending figure in summaries.
const AVERAGE_SPENDING_MONTHS: i32 = 3;

/// Result of tiling budget periods up to a target date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloverOutcome {
    pub budget_id: Uuid,
    pub periods_processed: usize,
    pub current_period: Option<BudgetPeriod>,
    pub previous_period: Option<BudgetPeriod>,
    pub rollover_amount: Decimal,
}

/// Spending analysis for a single budget's current period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budget_id: Uuid,
    pub budget_name: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub cadence: Cadence,
    pub period: BudgetPeriod,
    pub percentage_used: Decimal,
    pub days_remaining: i64,
    pub is_over_budget: bool,
    pub active_alerts: Vec<String>,
    pub average_monthly_spending: Option<Decimal>,
    pub projected_end_of_period: Decimal,
}

/// Portfolio-wide budget rollup. Budgets whose periods do not cover the
/// summary date are counted but carry no spending entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetOverview {
    pub total_budgets: usize,
    pub active_budgets: usize,
    pub total_budgeted: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub overall_percentage_used: Decimal,
    pub budgets: Vec<BudgetSummary>,
    pub unbudgeted_spending: Decimal,
    pub unbudgeted_categories: Vec<String>,
}

pub struct BudgetService;

impl BudgetService {
    /// Adds a budget and materializes its first period.
    pub fn add(profile: &mut Profile, budget: Budget) -> ServiceResult<Uuid> {
        Self::validate(profile, &budget, None)?;
        let id = profile.add_budget(budget);
        let Profile {
            budgets,
            transactions,
            ..
        } = profile;
        if let Some(budget) = budgets.iter_mut().find(|budget| budget.id == id) {
            Self::advance(budget, transactions);
        }
        Ok(id)
    }

    pub fn get<'a>(profile: &'a Profile, id: Uuid) -> ServiceResult<&'a Budget> {
        profile
            .budget(id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {id}")))
    }

    /// Replaces the editable fields. An amount change rebases the open
    /// period containing `today` and recomputes its totals.
    pub fn edit(
        profile: &mut Profile,
        id: Uuid,
        changes: Budget,
        today: NaiveDate,
    ) -> ServiceResult<()> {
        Self::validate(profile, &changes, Some(id))?;
        let Profile {
            budgets,
            transactions,
            ..
        } = profile;
        let budget = budgets
            .iter_mut()
            .find(|budget| budget.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {id}")))?;

        let amount_changed = budget.amount != changes.amount;
        budget.name = changes.name;
        budget.description = changes.description;
        budget.category_id = changes.category_id;
        budget.amount = changes.amount;
        budget.cadence = changes.cadence;
        budget.starts_on = changes.starts_on;
        budget.allow_rollover = changes.allow_rollover;
        budget.max_rollover_periods = changes.max_rollover_periods;
        budget.max_rollover_amount = changes.max_rollover_amount;
        budget.is_active = changes.is_active;

        if amount_changed {
            let amount = budget.amount;
            let category_id = budget.category_id;
            if let Some(period) = budget.period_containing_mut(today) {
                if !period.is_closed {
                    period.base_amount = amount;
                    period.total_amount = period.base_amount + period.rollover_amount;
                    Self::refresh_period(transactions, category_id, period);
                }
            }
        }
        profile.touch();
        Ok(())
    }

    pub fn remove(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        let before = profile.budgets.len();
        profile.budgets.retain(|budget| budget.id != id);
        if profile.budgets.len() == before {
            return Err(ServiceError::NotFound(format!("budget {id}")));
        }
        profile.touch();
        Ok(())
    }

    pub fn list<'a>(
        profile: &'a Profile,
        active_only: bool,
        category_id: Option<Uuid>,
    ) -> Vec<&'a Budget> {
        profile
            .budgets
            .iter()
            .filter(|budget| !active_only || budget.is_active)
            .filter(|budget| category_id.map_or(true, |id| budget.category_id == Some(id)))
            .collect()
    }

    pub fn add_alert(
        profile: &mut Profile,
        budget_id: Uuid,
        alert: BudgetAlert,
    ) -> ServiceResult<Uuid> {
        Self::validate_alert(&alert)?;
        let budget = profile
            .budget_mut(budget_id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {budget_id}")))?;
        if budget
            .alerts
            .iter()
            .any(|existing| existing.threshold_percent == alert.threshold_percent)
        {
            return Err(ServiceError::Invalid(format!(
                "Alert at {}% already exists",
                alert.threshold_percent
            )));
        }
        let id = alert.id;
        budget.alerts.push(alert);
        profile.touch();
        Ok(id)
    }

    pub fn edit_alert(
        profile: &mut Profile,
        budget_id: Uuid,
        alert_id: Uuid,
        changes: BudgetAlert,
    ) -> ServiceResult<()> {
        Self::validate_alert(&changes)?;
        let budget = profile
            .budget_mut(budget_id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {budget_id}")))?;
        if budget.alerts.iter().any(|existing| {
            existing.id != alert_id && existing.threshold_percent == changes.threshold_percent
        }) {
            return Err(ServiceError::Invalid(format!(
                "Alert at {}% already exists",
                changes.threshold_percent
            )));
        }
        let alert = budget
            .alerts
            .iter_mut()
            .find(|alert| alert.id == alert_id)
            .ok_or_else(|| ServiceError::NotFound(format!("alert {alert_id}")))?;
        alert.threshold_percent = changes.threshold_percent;
        alert.message = changes.message;
        alert.is_enabled = changes.is_enabled;
        profile.touch();
        Ok(())
    }

    pub fn remove_alert(
        profile: &mut Profile,
        budget_id: Uuid,
        alert_id: Uuid,
    ) -> ServiceResult<()> {
        let budget = profile
            .budget_mut(budget_id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {budget_id}")))?;
        let before = budget.alerts.len();
        budget.alerts.retain(|alert| alert.id != alert_id);
        if budget.alerts.len() == before {
            return Err(ServiceError::NotFound(format!("alert {alert_id}")));
        }
        profile.touch();
        Ok(())
    }

    /// Period covering `today`, if one has been materialized.
    pub fn current_period<'a>(
        profile: &'a Profile,
        budget_id: Uuid,
        today: NaiveDate,
    ) -> ServiceResult<Option<&'a BudgetPeriod>> {
        let budget = profile
            .budget(budget_id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {budget_id}")))?;
        Ok(budget.period_containing(today))
    }

    /// Tiles periods forward until one covers `today`, refreshes its spent
    /// total, and returns it. Works for budgets with or without rollover.
    pub fn ensure_current_period(
        profile: &mut Profile,
        budget_id: Uuid,
        today: NaiveDate,
    ) -> ServiceResult<BudgetPeriod> {
        let Profile {
            budgets,
            transactions,
            ..
        } = profile;
        let budget = budgets
            .iter_mut()
            .find(|budget| budget.id == budget_id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {budget_id}")))?;
        if today < budget.starts_on {
            return Err(ServiceError::Invalid(format!(
                "Budget `{}` starts on {}",
                budget.name, budget.starts_on
            )));
        }
        while budget
            .latest_period()
            .map_or(true, |period| period.ends_on < today)
        {
            Self::advance(budget, transactions);
        }
        let category_id = budget.category_id;
        let period = budget
            .period_containing_mut(today)
            .ok_or_else(|| ServiceError::Invalid("No period covers the requested date".into()))?;
        Self::refresh_period(transactions, category_id, period);
        let period = period.clone();
        profile.touch();
        Ok(period)
    }

    /// Closes the latest open period and opens the next one, applying the
    /// budget's rollover rules.
    pub fn create_next_period(
        profile: &mut Profile,
        budget_id: Uuid,
    ) -> ServiceResult<BudgetPeriod> {
        let Profile {
            budgets,
            transactions,
            ..
        } = profile;
        let budget = budgets
            .iter_mut()
            .find(|budget| budget.id == budget_id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {budget_id}")))?;
        let period = Self::advance(budget, transactions);
        profile.touch();
        Ok(period)
    }

    /// Creates every missing period between the latest one and
    /// `target_date`, carrying rollover across each boundary.
    pub fn process_rollover(
        profile: &mut Profile,
        budget_id: Uuid,
        target_date: NaiveDate,
    ) -> ServiceResult<RolloverOutcome> {
        let Profile {
            budgets,
            transactions,
            ..
        } = profile;
        let budget = budgets
            .iter_mut()
            .find(|budget| budget.id == budget_id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget {budget_id}")))?;
        if !budget.allow_rollover {
            return Err(ServiceError::Invalid(format!(
                "Rollover is not enabled for budget `{}`",
                budget.name
            )));
        }

        let mut periods_processed = 0;
        while budget
            .latest_period()
            .map_or(true, |period| period.ends_on < target_date)
        {
            Self::advance(budget, transactions);
            periods_processed += 1;
        }

        let current_period = budget.period_containing(target_date).cloned();
        let previous_period = current_period.as_ref().and_then(|current| {
            budget
                .periods
                .iter()
                .filter(|period| period.ends_on < current.starts_on)
                .max_by_key(|period| period.ends_on)
                .cloned()
        });
        let rollover_amount = current_period
            .as_ref()
            .map_or(Decimal::ZERO, |period| period.rollover_amount);

        profile.touch();
        Ok(RolloverOutcome {
            budget_id,
            periods_processed,
            current_period,
            previous_period,
            rollover_amount,
        })
    }

    /// Spending analysis for one budget, or for every active budget.
    pub fn summary(
        profile: &mut Profile,
        budget_id: Option<Uuid>,
        today: NaiveDate,
    ) -> ServiceResult<BudgetOverview> {
        let ids: Vec<Uuid> = match budget_id {
            Some(id) => {
                profile
                    .budget(id)
                    .ok_or_else(|| ServiceError::NotFound(format!("budget {id}")))?;
                vec![id]
            }
            None => profile
                .budgets
                .iter()
                .filter(|budget| budget.is_active)
                .map(|budget| budget.id)
                .collect(),
        };

        let total_budgets = ids.len();
        let active_budgets = ids
            .iter()
            .filter(|id| profile.budget(**id).map_or(false, |budget| budget.is_active))
            .count();

        let mut entries = Vec::new();
        let mut total_budgeted = Decimal::ZERO;
        let mut total_spent = Decimal::ZERO;
        let mut total_remaining = Decimal::ZERO;

        for id in ids {
            let snapshot = {
                let Profile {
                    budgets,
                    transactions,
                    ..
                } = &mut *profile;
                match budgets.iter_mut().find(|budget| budget.id == id) {
                    Some(budget) => {
                        let category_id = budget.category_id;
                        let name = budget.name.clone();
                        let cadence = budget.cadence.clone();
                        let alerts = budget.alerts.clone();
                        match budget.period_containing_mut(today) {
                            Some(period) => {
                                Self::refresh_period(transactions, category_id, period);
                                Some((period.clone(), name, category_id, cadence, alerts))
                            }
                            None => None,
                        }
                    }
                    None => None,
                }
            };
            let Some((period, budget_name, category_id, cadence, alerts)) = snapshot else {
                continue;
            };

            let percentage_used = if period.total_amount > Decimal::ZERO {
                period.spent_amount / period.total_amount * dec!(100)
            } else {
                Decimal::ZERO
            };
            let days_remaining = (period.ends_on - today).num_days() + 1;

            let mut active_alerts = Vec::new();
            for alert in &alerts {
                if alert.is_enabled
                    && percentage_used >= Decimal::from(alert.threshold_percent)
                {
                    let message = alert.message.clone().unwrap_or_else(|| {
                        format!("Budget is {}% used", percentage_used.round_dp(1))
                    });
                    active_alerts.push(message);
                }
            }

            let projected_end_of_period =
                if days_remaining > 0 && period.spent_amount > Decimal::ZERO {
                    let days_elapsed =
                        Decimal::from((today - period.starts_on).num_days() + 1);
                    let daily_rate = period.spent_amount / days_elapsed;
                    daily_rate * Decimal::from(period.length_days())
                } else {
                    period.spent_amount
                };

            let category_name = category_id
                .and_then(|id| profile.category(id))
                .map(|category| category.name.clone());
            let average_monthly_spending =
                Self::average_monthly_spending(profile, category_id, today);

            total_budgeted += period.total_amount;
            total_spent += period.spent_amount;
            total_remaining += period.remaining_amount;

            entries.push(BudgetSummary {
                budget_id: id,
                budget_name,
                category_id,
                category_name,
                cadence,
                percentage_used,
                days_remaining,
                is_over_budget: period.spent_amount > period.total_amount,
                active_alerts,
                average_monthly_spending,
                projected_end_of_period,
                period,
            });
        }

        let (unbudgeted_spending, unbudgeted_categories) =
            Self::unbudgeted_spending(profile, today);
        let overall_percentage_used = if total_budgeted > Decimal::ZERO {
            total_spent / total_budgeted * dec!(100)
        } else {
            Decimal::ZERO
        };

        Ok(BudgetOverview {
            total_budgets,
            active_budgets,
            total_budgeted,
            total_spent,
            total_remaining,
            overall_percentage_used,
            budgets: entries,
            unbudgeted_spending,
            unbudgeted_categories,
        })
    }

    /// Month-to-date expenses in categories no active budget covers.
    /// Uncategorized spending is not counted.
    pub fn unbudgeted_spending(profile: &Profile, today: NaiveDate) -> (Decimal, Vec<String>) {
        let month_start = today.with_day(1).unwrap_or(today);
        let budgeted: HashSet<Uuid> = profile
            .budgets
            .iter()
            .filter(|budget| budget.is_active)
            .filter_map(|budget| budget.category_id)
            .collect();

        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        for txn in &profile.transactions {
            if !txn.is_expense() || txn.occurred_on < month_start {
                continue;
            }
            let Some(category_id) = txn.category_id else {
                continue;
            };
            if budgeted.contains(&category_id) {
                continue;
            }
            let Some(category) = profile.category(category_id) else {
                continue;
            };
            *by_category
                .entry(category.name.clone())
                .or_insert(Decimal::ZERO) += txn.amount;
        }

        let amount = by_category.values().copied().sum();
        let categories = by_category.into_keys().collect();
        (amount, categories)
    }

    /// Closes the latest open period (if any) and appends the next one.
    /// With no periods yet, materializes the initial period instead.
    fn advance(budget: &mut Budget, transactions: &[Transaction]) -> BudgetPeriod {
        let latest_index = budget
            .periods
            .iter()
            .enumerate()
            .max_by_key(|(_, period)| period.ends_on)
            .map(|(index, _)| index);

        let Some(latest_index) = latest_index else {
            let ends_on = budget.cadence.period_end(budget.starts_on);
            let mut period =
                BudgetPeriod::new(budget.starts_on, ends_on, budget.amount, Decimal::ZERO);
            Self::refresh_period(transactions, budget.category_id, &mut period);
            budget.periods.push(period.clone());
            return period;
        };

        if !budget.periods[latest_index].is_closed {
            let category_id = budget.category_id;
            Self::refresh_period(transactions, category_id, &mut budget.periods[latest_index]);
            budget.periods[latest_index].is_closed = true;
        }

        let previous = budget.periods[latest_index].clone();
        let starts_on = previous.ends_on + Duration::days(1);
        let ends_on = budget.cadence.period_end(starts_on);

        let mut rollover = Decimal::ZERO;
        if budget.allow_rollover && previous.remaining_amount > Decimal::ZERO {
            rollover = previous.remaining_amount;
            if let Some(max_periods) = budget.max_rollover_periods {
                let carried = budget
                    .periods
                    .iter()
                    .filter(|period| {
                        period.rollover_amount > Decimal::ZERO && period.ends_on < starts_on
                    })
                    .count();
                if carried as u32 >= max_periods {
                    rollover = Decimal::ZERO;
                }
            }
            if let Some(max_amount) = budget.max_rollover_amount {
                rollover = rollover.min(max_amount);
            }
        }

        let mut period = BudgetPeriod::new(starts_on, ends_on, budget.amount, rollover);
        Self::refresh_period(transactions, budget.category_id, &mut period);
        budget.periods.push(period.clone());
        period
    }

    /// Recomputes the cached spent and remaining amounts from the log.
    fn refresh_period(
        transactions: &[Transaction],
        category_id: Option<Uuid>,
        period: &mut BudgetPeriod,
    ) {
        let spent = Self::spent_between(transactions, category_id, period.starts_on, period.ends_on);
        period.spent_amount = spent;
        period.remaining_amount = period.total_amount - spent;
    }

    fn spent_between(
        transactions: &[Transaction],
        category_id: Option<Uuid>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Decimal {
        transactions
            .iter()
            .filter(|txn| txn.is_expense())
            .filter(|txn| txn.occurred_on >= start && txn.occurred_on <= end)
            .filter(|txn| category_id.map_or(true, |id| txn.category_id == Some(id)))
            .map(|txn| txn.amount)
            .sum()
    }

    fn average_monthly_spending(
        profile: &Profile,
        category_id: Option<Uuid>,
        today: NaiveDate,
    ) -> Option<Decimal> {
        let window_start = shift_month(today, -AVERAGE_SPENDING_MONTHS);
        let total: Decimal = profile
            .transactions
            .iter()
            .filter(|txn| txn.is_expense())
            .filter(|txn| txn.occurred_on >= window_start && txn.occurred_on <= today)
            .filter(|txn| category_id.map_or(true, |id| txn.category_id == Some(id)))
            .map(|txn| txn.amount)
            .sum();
        if total > Decimal::ZERO {
            Some(total / Decimal::from(AVERAGE_SPENDING_MONTHS))
        } else {
            None
        }
    }

    fn validate(profile: &Profile, budget: &Budget, exclude: Option<Uuid>) -> ServiceResult<()> {
        if budget.name.trim().is_empty() {
            return Err(ServiceError::Invalid("Budget name cannot be empty".into()));
        }
        let normalized = budget.name.trim().to_lowercase();
        let duplicate = profile.budgets.iter().any(|existing| {
            existing.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| existing.id != id)
        });
        if duplicate {
            return Err(ServiceError::Invalid(format!(
                "Budget `{}` already exists",
                budget.name
            )));
        }
        if budget.amount <= Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "Budget amount must be positive".into(),
            ));
        }
        if let Some(category_id) = budget.category_id {
            if profile.category(category_id).is_none() {
                return Err(ServiceError::NotFound(format!("category {category_id}")));
            }
        }
        if budget.max_rollover_periods == Some(0) {
            return Err(ServiceError::Invalid(
                "Rollover period cap must be at least 1".into(),
            ));
        }
        if let Some(max_amount) = budget.max_rollover_amount {
            if max_amount < Decimal::ZERO {
                return Err(ServiceError::Invalid(
                    "Rollover amount cap cannot be negative".into(),
                ));
            }
        }
        let mut thresholds = HashSet::new();
        for alert in &budget.alerts {
            Self::validate_alert(alert)?;
            if !thresholds.insert(alert.threshold_percent) {
                return Err(ServiceError::Invalid(format!(
                    "Alert at {}% already exists",
                    alert.threshold_percent
                )));
            }
        }
        Ok(())
    }

    fn validate_alert(alert: &BudgetAlert) -> ServiceResult<()> {
        if !(1..=100).contains(&alert.threshold_percent) {
            return Err(ServiceError::Invalid(
                "Alert threshold must be between 1 and 100".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::{Category, Transaction, TransactionKind};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn base_profile() -> Profile {
        Profile::new("test")
    }

    fn expense(profile: &mut Profile, amount: Decimal, on: NaiveDate, category: Option<Uuid>) {
        let mut txn = Transaction::new(amount, on, "expense", TransactionKind::Expense);
        txn.category_id = category;
        profile.add_transaction(txn);
    }

    fn weekly_budget(name: &str, amount: Decimal) -> Budget {
        Budget::new(name, amount, Cadence::Weekly, date(2024, 1, 1))
    }

    #[test]
    fn add_creates_initial_period() {
        let mut profile = base_profile();
        let id = BudgetService::add(&mut profile, weekly_budget("Food", dec!(100))).unwrap();

        let budget = profile.budget(id).unwrap();
        assert_eq!(budget.periods.len(), 1);
        let period = &budget.periods[0];
        assert_eq!(period.starts_on, date(2024, 1, 1));
        assert_eq!(period.ends_on, date(2024, 1, 7));
        assert_eq!(period.total_amount, dec!(100));
        assert!(!period.is_closed);
    }

    #[test]
    fn add_validates_budget() {
        let mut profile = base_profile();
        BudgetService::add(&mut profile, weekly_budget("Food", dec!(100))).unwrap();

        let err = BudgetService::add(&mut profile, weekly_budget(" food ", dec!(50)))
            .expect_err("duplicate name");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let err = BudgetService::add(&mut profile, weekly_budget("Zero", Decimal::ZERO))
            .expect_err("zero amount");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let err = BudgetService::add(
            &mut profile,
            weekly_budget("Scoped", dec!(50)).with_category(Uuid::new_v4()),
        )
        .expect_err("unknown category");
        assert!(matches!(err, ServiceError::NotFound(_)));

        let capped = weekly_budget("Capped", dec!(50)).with_rollover(Some(0), None);
        let err = BudgetService::add(&mut profile, capped).expect_err("zero period cap");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn next_period_rolls_over_remaining() {
        let mut profile = base_profile();
        let id = BudgetService::add(
            &mut profile,
            weekly_budget("Food", dec!(100)).with_rollover(None, None),
        )
        .unwrap();
        expense(&mut profile, dec!(30), date(2024, 1, 3), None);

        let next = BudgetService::create_next_period(&mut profile, id).unwrap();
        assert_eq!(next.starts_on, date(2024, 1, 8));
        assert_eq!(next.ends_on, date(2024, 1, 14));
        assert_eq!(next.rollover_amount, dec!(70));
        assert_eq!(next.total_amount, dec!(170));

        let budget = profile.budget(id).unwrap();
        let first = &budget.periods[0];
        assert!(first.is_closed);
        assert_eq!(first.spent_amount, dec!(30));
        assert_eq!(first.remaining_amount, dec!(70));
    }

    #[test]
    fn next_period_without_rollover_resets() {
        let mut profile = base_profile();
        let id = BudgetService::add(&mut profile, weekly_budget("Food", dec!(100))).unwrap();

        let next = BudgetService::create_next_period(&mut profile, id).unwrap();
        assert_eq!(next.rollover_amount, Decimal::ZERO);
        assert_eq!(next.total_amount, dec!(100));
    }

    #[test]
    fn rollover_respects_amount_cap() {
        let mut profile = base_profile();
        let id = BudgetService::add(
            &mut profile,
            weekly_budget("Food", dec!(100)).with_rollover(None, Some(dec!(50))),
        )
        .unwrap();
        expense(&mut profile, dec!(30), date(2024, 1, 3), None);

        let next = BudgetService::create_next_period(&mut profile, id).unwrap();
        assert_eq!(next.rollover_amount, dec!(50));
        assert_eq!(next.total_amount, dec!(150));
    }

    #[test]
    fn rollover_respects_period_cap() {
        let mut profile = base_profile();
        let id = BudgetService::add(
            &mut profile,
            weekly_budget("Food", dec!(100)).with_rollover(Some(1), None),
        )
        .unwrap();

        // Nothing spent, so each closed period leaves its full amount.
        let second = BudgetService::create_next_period(&mut profile, id).unwrap();
        assert_eq!(second.rollover_amount, dec!(100));
        assert_eq!(second.total_amount, dec!(200));

        // One period already carried rollover, so the cap zeroes this one.
        let third = BudgetService::create_next_period(&mut profile, id).unwrap();
        assert_eq!(third.rollover_amount, Decimal::ZERO);
        assert_eq!(third.total_amount, dec!(100));
    }

    #[test]
    fn process_rollover_tiles_to_target() {
        let mut profile = base_profile();
        let id = BudgetService::add(
            &mut profile,
            Budget::new("Food", dec!(100), Cadence::Monthly, date(2024, 1, 1))
                .with_rollover(None, None),
        )
        .unwrap();

        let outcome =
            BudgetService::process_rollover(&mut profile, id, date(2024, 3, 15)).unwrap();
        assert_eq!(outcome.periods_processed, 2);

        let current = outcome.current_period.unwrap();
        assert_eq!(current.starts_on, date(2024, 3, 1));
        assert_eq!(current.ends_on, date(2024, 3, 31));
        // January's 100 rolled into February, and February's 200 rolled on.
        assert_eq!(outcome.rollover_amount, dec!(200));

        let previous = outcome.previous_period.unwrap();
        assert_eq!(previous.ends_on, date(2024, 2, 29));
    }

    #[test]
    fn process_rollover_requires_rollover_enabled() {
        let mut profile = base_profile();
        let id = BudgetService::add(&mut profile, weekly_budget("Food", dec!(100))).unwrap();

        let err = BudgetService::process_rollover(&mut profile, id, date(2024, 2, 1))
            .expect_err("rollover disabled");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn ensure_current_period_tiles_any_budget() {
        let mut profile = base_profile();
        let id = BudgetService::add(
            &mut profile,
            Budget::new("Food", dec!(100), Cadence::Monthly, date(2024, 1, 1)),
        )
        .unwrap();

        let period =
            BudgetService::ensure_current_period(&mut profile, id, date(2024, 3, 10)).unwrap();
        assert_eq!(period.starts_on, date(2024, 3, 1));
        assert_eq!(period.rollover_amount, Decimal::ZERO);
        assert_eq!(profile.budget(id).unwrap().periods.len(), 3);

        let err = BudgetService::ensure_current_period(&mut profile, id, date(2023, 12, 1))
            .expect_err("before budget start");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn period_spent_respects_category_scope() {
        let mut profile = base_profile();
        let groceries =
            profile.add_category(Category::new("Groceries", TransactionKind::Expense));
        let id = BudgetService::add(
            &mut profile,
            Budget::new("Groceries", dec!(300), Cadence::Monthly, date(2024, 6, 1))
                .with_category(groceries),
        )
        .unwrap();

        expense(&mut profile, dec!(120), date(2024, 6, 5), Some(groceries));
        expense(&mut profile, dec!(50), date(2024, 6, 6), None);

        let period =
            BudgetService::ensure_current_period(&mut profile, id, date(2024, 6, 10)).unwrap();
        assert_eq!(period.spent_amount, dec!(120));
        assert_eq!(period.remaining_amount, dec!(180));
    }

    #[test]
    fn summary_reports_usage_and_alerts() {
        let mut profile = base_profile();
        let groceries =
            profile.add_category(Category::new("Groceries", TransactionKind::Expense));
        let other = profile.add_category(Category::new("Other", TransactionKind::Expense));
        let id = BudgetService::add(
            &mut profile,
            Budget::new("Groceries", dec!(300), Cadence::Monthly, date(2024, 6, 1))
                .with_category(groceries),
        )
        .unwrap();
        BudgetService::add_alert(&mut profile, id, BudgetAlert::new(30)).unwrap();
        BudgetService::add_alert(&mut profile, id, BudgetAlert::new(90)).unwrap();

        expense(&mut profile, dec!(120), date(2024, 6, 5), Some(groceries));
        expense(&mut profile, dec!(50), date(2024, 6, 6), Some(other));
        expense(&mut profile, dec!(25), date(2024, 6, 7), None);

        let overview = BudgetService::summary(&mut profile, None, date(2024, 6, 10)).unwrap();
        assert_eq!(overview.total_budgets, 1);
        assert_eq!(overview.total_budgeted, dec!(300));
        assert_eq!(overview.total_spent, dec!(120));
        assert_eq!(overview.overall_percentage_used, dec!(40.0));

        let entry = &overview.budgets[0];
        assert_eq!(entry.category_name.as_deref(), Some("Groceries"));
        assert_eq!(entry.days_remaining, 21);
        assert!(!entry.is_over_budget);
        // 120 spent over 10 elapsed days projects to 360 over 30 days.
        assert_eq!(entry.projected_end_of_period, dec!(360));
        assert_eq!(entry.active_alerts, vec!["Budget is 40.0% used".to_string()]);
        assert_eq!(entry.average_monthly_spending, Some(dec!(40)));

        // Only the categorized, unbudgeted expense counts.
        assert_eq!(overview.unbudgeted_spending, dec!(50));
        assert_eq!(overview.unbudgeted_categories, vec!["Other".to_string()]);
    }

    #[test]
    fn summary_skips_budgets_without_current_period() {
        let mut profile = base_profile();
        BudgetService::add(&mut profile, weekly_budget("Stale", dec!(100))).unwrap();

        let overview = BudgetService::summary(&mut profile, None, date(2024, 6, 1)).unwrap();
        assert_eq!(overview.total_budgets, 1);
        assert!(overview.budgets.is_empty());
        assert_eq!(overview.total_budgeted, Decimal::ZERO);
    }

    #[test]
    fn edit_rebases_open_period() {
        let mut profile = base_profile();
        let id = BudgetService::add(
            &mut profile,
            Budget::new("Food", dec!(100), Cadence::Monthly, date(2024, 6, 1)),
        )
        .unwrap();
        expense(&mut profile, dec!(20), date(2024, 6, 5), None);

        let mut changes = profile.budget(id).unwrap().clone();
        changes.amount = dec!(200);
        BudgetService::edit(&mut profile, id, changes, date(2024, 6, 10)).unwrap();

        let budget = profile.budget(id).unwrap();
        let period = budget.period_containing(date(2024, 6, 10)).unwrap();
        assert_eq!(period.base_amount, dec!(200));
        assert_eq!(period.total_amount, dec!(200));
        assert_eq!(period.spent_amount, dec!(20));
        assert_eq!(period.remaining_amount, dec!(180));
    }

    #[test]
    fn alert_management_validates_thresholds() {
        let mut profile = base_profile();
        let id = BudgetService::add(&mut profile, weekly_budget("Food", dec!(100))).unwrap();

        let err = BudgetService::add_alert(&mut profile, id, BudgetAlert::new(0))
            .expect_err("threshold too low");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let alert_id = BudgetService::add_alert(&mut profile, id, BudgetAlert::new(80)).unwrap();
        let err = BudgetService::add_alert(&mut profile, id, BudgetAlert::new(80))
            .expect_err("duplicate threshold");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let mut changes = BudgetAlert::new(90);
        changes.message = Some("Slow down".into());
        BudgetService::edit_alert(&mut profile, id, alert_id, changes).unwrap();
        let budget = profile.budget(id).unwrap();
        assert_eq!(budget.alerts[0].threshold_percent, 90);
        assert_eq!(budget.alerts[0].message.as_deref(), Some("Slow down"));

        BudgetService::remove_alert(&mut profile, id, alert_id).unwrap();
        assert!(profile.budget(id).unwrap().alerts.is_empty());
    }

    #[test]
    fn list_filters_by_activity_and_category() {
        let mut profile = base_profile();
        let category = profile.add_category(Category::new("Fun", TransactionKind::Expense));
        BudgetService::add(
            &mut profile,
            weekly_budget("Scoped", dec!(50)).with_category(category),
        )
        .unwrap();
        let idle = BudgetService::add(&mut profile, weekly_budget("Idle", dec!(50))).unwrap();
        profile.budget_mut(idle).unwrap().is_active = false;

        assert_eq!(BudgetService::list(&profile, true, None).len(), 1);
        assert_eq!(BudgetService::list(&profile, false, None).len(), 2);
        assert_eq!(
            BudgetService::list(&profile, true, Some(category)).len(),
            1
        );
    }
}
