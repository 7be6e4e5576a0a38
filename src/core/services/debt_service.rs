use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Debt, DebtKind, DebtPayment, DebtStatus, Profile};

use super::{ServiceError, ServiceResult};

/// Ceiling on amortization length; anything longer counts as never paid off.
const MAX_PAYOFF_MONTHS: u32 = 1000;

/// Number of rows in an interest breakdown schedule.
const BREAKDOWN_MONTHS: u32 = 12;

/// Order in which debts receive extra payments in a payoff plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PayoffStrategy {
    /// Smallest balance first.
    Snowball,
    /// Highest interest rate first.
    Avalanche,
    /// Keep the caller-provided ordering.
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtProjection {
    pub debt_id: Uuid,
    pub debt_name: String,
    pub current_balance: Decimal,
    pub payoff_order: u32,
    pub months_to_payoff: u32,
    pub payoff_date: NaiveDate,
    pub total_interest: Decimal,
    pub total_payments: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub strategy: PayoffStrategy,
    pub extra_monthly_payment: Decimal,
    pub debts: Vec<DebtProjection>,
    pub total_months: u32,
    pub total_interest: Decimal,
    pub debt_free_date: NaiveDate,
    pub interest_saved: Decimal,
    pub months_saved: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestBreakdownRow {
    pub month: u32,
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub remaining_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestBreakdown {
    pub principal: Decimal,
    pub annual_rate: Decimal,
    pub monthly_payment: Decimal,
    pub months_to_payoff: u32,
    pub total_interest: Decimal,
    pub total_payments: Decimal,
    pub interest_percentage: Decimal,
    pub monthly_breakdown: Vec<InterestBreakdownRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtSummary {
    pub total_debt: Decimal,
    pub total_original_debt: Decimal,
    pub total_paid: Decimal,
    pub total_interest_paid: Decimal,
    pub active_debt_count: usize,
    pub paid_off_debt_count: usize,
    pub average_interest_rate: Decimal,
    pub total_minimum_payment: Decimal,
    pub debts_by_kind: BTreeMap<DebtKind, usize>,
}

/// Debt tracking, amortization math, and payoff planning.
pub struct DebtService;

impl DebtService {
    pub fn add(profile: &mut Profile, debt: Debt) -> ServiceResult<Uuid> {
        Self::validate(&debt)?;
        Ok(profile.add_debt(debt))
    }

    pub fn get<'a>(profile: &'a Profile, id: Uuid) -> ServiceResult<&'a Debt> {
        profile
            .debt(id)
            .ok_or_else(|| ServiceError::NotFound(format!("debt {id}")))
    }

    /// Replaces the editable fields of a debt. Payment history is untouched.
    pub fn edit(profile: &mut Profile, id: Uuid, changes: Debt) -> ServiceResult<()> {
        Self::validate(&changes)?;
        let debt = profile
            .debt_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("debt {id}")))?;
        debt.name = changes.name;
        debt.kind = changes.kind;
        debt.status = changes.status;
        debt.original_amount = changes.original_amount;
        debt.current_balance = changes.current_balance;
        debt.interest_rate = changes.interest_rate;
        debt.minimum_payment = changes.minimum_payment;
        debt.due_day = changes.due_day;
        debt.lender = changes.lender;
        debt.notes = changes.notes;
        debt.is_active = changes.is_active;
        profile.touch();
        Ok(())
    }

    /// Marks the debt inactive while keeping its history.
    pub fn remove(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        let debt = profile
            .debt_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("debt {id}")))?;
        debt.is_active = false;
        profile.touch();
        Ok(())
    }

    pub fn list<'a>(
        profile: &'a Profile,
        include_inactive: bool,
        kind: Option<&DebtKind>,
    ) -> Vec<&'a Debt> {
        profile
            .debts
            .iter()
            .filter(|debt| include_inactive || debt.is_active)
            .filter(|debt| kind.map_or(true, |kind| &debt.kind == kind))
            .collect()
    }

    /// Months until payoff and the total interest paid along the way.
    ///
    /// Returns `Some((0, 0))` when there is nothing left to pay and `None`
    /// when the payment never retires the balance.
    pub fn calculate_payoff_time(
        balance: Decimal,
        annual_rate: Decimal,
        payment: Decimal,
    ) -> Option<(u32, Decimal)> {
        if balance <= Decimal::ZERO || payment <= Decimal::ZERO {
            return Some((0, Decimal::ZERO));
        }
        let monthly_rate = annual_rate / dec!(100) / dec!(12);
        if payment <= balance * monthly_rate {
            return None;
        }

        let mut remaining = balance;
        let mut total_interest = Decimal::ZERO;
        let mut months = 0u32;
        while remaining > Decimal::ZERO && months < MAX_PAYOFF_MONTHS {
            let mut interest = remaining * monthly_rate;
            let mut principal = payment - interest;
            if principal > remaining {
                // Final month: pro-rate interest for the partial payment.
                principal = remaining;
                interest = remaining * monthly_rate * (remaining / payment);
            }
            remaining -= principal;
            total_interest += interest;
            months += 1;
        }
        if months >= MAX_PAYOFF_MONTHS {
            return None;
        }
        Some((months, total_interest.round_dp(2)))
    }

    /// Splits a payment into principal and interest against the current
    /// balance. Interest is one month of the annual rate, rounded half-up.
    pub fn payment_split(
        balance: Decimal,
        annual_rate: Decimal,
        payment: Decimal,
    ) -> (Decimal, Decimal) {
        let monthly_rate = annual_rate / dec!(100) / dec!(12);
        let mut interest = (balance * monthly_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if interest > payment {
            return (Decimal::ZERO, payment);
        }
        let mut principal = payment - interest;
        if principal > balance {
            principal = balance;
            interest = payment - principal;
        }
        (principal, interest)
    }

    /// First-year amortization schedule plus lifetime interest totals.
    pub fn interest_breakdown(
        principal: Decimal,
        annual_rate: Decimal,
        monthly_payment: Decimal,
    ) -> ServiceResult<InterestBreakdown> {
        let (months, total_interest) =
            Self::calculate_payoff_time(principal, annual_rate, monthly_payment).ok_or_else(
                || {
                    ServiceError::Invalid(
                        "Monthly payment is too low to ever pay off this balance".into(),
                    )
                },
            )?;

        let monthly_rate = annual_rate / dec!(100) / dec!(12);
        let mut remaining = principal;
        let mut monthly_breakdown = Vec::new();
        for month in 0..months.min(BREAKDOWN_MONTHS) {
            let interest = remaining * monthly_rate;
            let mut principal_part = monthly_payment - interest;
            if principal_part > remaining {
                principal_part = remaining;
            }
            remaining -= principal_part;
            monthly_breakdown.push(InterestBreakdownRow {
                month: month + 1,
                payment: monthly_payment,
                principal: principal_part,
                interest,
                remaining_balance: remaining,
            });
        }

        let total_payments = monthly_payment * Decimal::from(months);
        let interest_percentage = if total_payments > Decimal::ZERO {
            (total_interest / total_payments * dec!(100)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        Ok(InterestBreakdown {
            principal,
            annual_rate,
            monthly_payment,
            months_to_payoff: months,
            total_interest,
            total_payments,
            interest_percentage,
            monthly_breakdown,
        })
    }

    /// Projects payoff for the active debts under the given strategy.
    ///
    /// The extra payment goes to the first debt in strategy order, and each
    /// retired debt frees its minimum payment into the extra pool. Savings
    /// are measured against paying minimums only.
    pub fn generate_payoff_plan(
        profile: &Profile,
        strategy: PayoffStrategy,
        extra_payment: Decimal,
        debt_ids: Option<&[Uuid]>,
        today: NaiveDate,
    ) -> PayoffPlan {
        let mut debts: Vec<&Debt> = profile
            .debts
            .iter()
            .filter(|debt| debt.is_active)
            .filter(|debt| debt_ids.map_or(true, |ids| ids.contains(&debt.id)))
            .collect();

        if debts.is_empty() {
            return PayoffPlan {
                strategy,
                extra_monthly_payment: extra_payment,
                debts: Vec::new(),
                total_months: 0,
                total_interest: Decimal::ZERO,
                debt_free_date: today,
                interest_saved: Decimal::ZERO,
                months_saved: 0,
            };
        }

        match strategy {
            PayoffStrategy::Snowball => {
                debts.sort_by(|a, b| a.current_balance.cmp(&b.current_balance));
            }
            PayoffStrategy::Avalanche => {
                debts.sort_by(|a, b| b.interest_rate.cmp(&a.interest_rate));
            }
            PayoffStrategy::Custom => {}
        }

        let mut projections = Vec::new();
        let mut total_interest = Decimal::ZERO;
        let mut total_months = 0u32;
        let mut available_extra = extra_payment;

        for (index, debt) in debts.iter().enumerate() {
            let payment = if index == 0 {
                debt.minimum_payment + available_extra
            } else {
                debt.minimum_payment
            };
            let Some((months, interest)) =
                Self::calculate_payoff_time(debt.current_balance, debt.interest_rate, payment)
            else {
                warn!(debt = %debt.name, "payment never retires balance, skipping");
                continue;
            };

            projections.push(DebtProjection {
                debt_id: debt.id,
                debt_name: debt.name.clone(),
                current_balance: debt.current_balance,
                payoff_order: index as u32 + 1,
                months_to_payoff: months,
                payoff_date: today + Duration::days(i64::from(months) * 30),
                total_interest: interest,
                total_payments: debt.current_balance + interest,
            });
            total_interest += interest;
            total_months = total_months.max(months);
            available_extra += debt.minimum_payment;
        }

        let mut baseline_months = 0u32;
        let mut baseline_interest = Decimal::ZERO;
        for debt in &debts {
            if let Some((months, interest)) = Self::calculate_payoff_time(
                debt.current_balance,
                debt.interest_rate,
                debt.minimum_payment,
            ) {
                if months > 0 {
                    baseline_months = baseline_months.max(months);
                    baseline_interest += interest;
                }
            }
        }

        PayoffPlan {
            strategy,
            extra_monthly_payment: extra_payment,
            debts: projections,
            total_months,
            total_interest,
            debt_free_date: today + Duration::days(i64::from(total_months) * 30),
            interest_saved: (baseline_interest - total_interest).round_dp(2),
            months_saved: baseline_months.saturating_sub(total_months),
        }
    }

    /// Applies a payment to a debt, splitting principal from interest and
    /// retiring the debt once the balance reaches zero.
    pub fn record_payment(
        profile: &mut Profile,
        debt_id: Uuid,
        amount: Decimal,
        paid_on: NaiveDate,
        is_extra: bool,
        notes: Option<String>,
    ) -> ServiceResult<DebtPayment> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "Payment amount must be positive".into(),
            ));
        }
        let debt = profile
            .debt_mut(debt_id)
            .ok_or_else(|| ServiceError::NotFound(format!("debt {debt_id}")))?;
        if debt.is_paid_off() {
            return Err(ServiceError::Invalid(format!(
                "{} is already paid off",
                debt.name
            )));
        }

        let (principal, interest) =
            Self::payment_split(debt.current_balance, debt.interest_rate, amount);
        let mut payment = DebtPayment::new(debt_id, amount, paid_on, principal, interest);
        payment.is_extra = is_extra;
        payment.notes = notes;

        debt.current_balance -= principal;
        if debt.current_balance <= Decimal::ZERO {
            debt.current_balance = dec!(0.00);
            debt.status = DebtStatus::PaidOff;
        }
        debt.payments.push(payment.clone());
        profile.touch();
        Ok(payment)
    }

    pub fn summary(profile: &Profile) -> DebtSummary {
        let mut summary = DebtSummary::default();
        let mut weighted_rate = Decimal::ZERO;
        for debt in &profile.debts {
            summary.total_original_debt += debt.original_amount;
            match debt.status {
                DebtStatus::Active => {
                    summary.total_debt += debt.current_balance;
                    summary.total_minimum_payment += debt.minimum_payment;
                    summary.active_debt_count += 1;
                    weighted_rate += debt.interest_rate * debt.current_balance;
                }
                DebtStatus::PaidOff => summary.paid_off_debt_count += 1,
                _ => {}
            }
            *summary.debts_by_kind.entry(debt.kind.clone()).or_insert(0) += 1;
            summary.total_paid += debt.total_paid();
            summary.total_interest_paid += debt.total_interest_paid();
        }
        if summary.total_debt > Decimal::ZERO {
            summary.average_interest_rate = (weighted_rate / summary.total_debt).round_dp(2);
        }
        summary
    }

    fn validate(debt: &Debt) -> ServiceResult<()> {
        if debt.name.trim().is_empty() {
            return Err(ServiceError::Invalid("Debt name cannot be empty".into()));
        }
        if debt.original_amount <= Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "Original amount must be positive".into(),
            ));
        }
        if debt.current_balance < Decimal::ZERO || debt.current_balance > debt.original_amount {
            return Err(ServiceError::Invalid(
                "Current balance must be between zero and the original amount".into(),
            ));
        }
        if debt.interest_rate < Decimal::ZERO || debt.interest_rate > dec!(100) {
            return Err(ServiceError::Invalid(
                "Interest rate must be between 0 and 100".into(),
            ));
        }
        if debt.minimum_payment < Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "Minimum payment cannot be negative".into(),
            ));
        }
        if let Some(day) = debt.due_day {
            if !(1..=31).contains(&day) {
                return Err(ServiceError::Invalid(
                    "Due day must be between 1 and 31".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_debt(name: &str, balance: Decimal, rate: Decimal, minimum: Decimal) -> Debt {
        Debt::new(
            name,
            DebtKind::CreditCard,
            balance,
            balance,
            rate,
            minimum,
            date(2024, 1, 1),
        )
    }

    fn base_profile() -> Profile {
        Profile::new("test")
    }

    #[test]
    fn payoff_time_amortizes_with_interest() {
        let (months, interest) =
            DebtService::calculate_payoff_time(dec!(1000), dec!(12), dec!(100)).unwrap();
        assert_eq!(months, 11);
        assert!(interest > Decimal::ZERO);
        assert!(interest < dec!(100));
    }

    #[test]
    fn payoff_time_never_when_payment_below_interest() {
        // 10_000 at 12% accrues 100/month, exactly the payment.
        let result = DebtService::calculate_payoff_time(dec!(10000), dec!(12), dec!(100));
        assert!(result.is_none());
    }

    #[test]
    fn payoff_time_single_month_prorates_interest() {
        let (months, interest) =
            DebtService::calculate_payoff_time(dec!(100), dec!(12), dec!(200)).unwrap();
        assert_eq!(months, 1);
        assert_eq!(interest, dec!(0.50));
    }

    #[test]
    fn payoff_time_zero_balance_is_immediate() {
        let (months, interest) =
            DebtService::calculate_payoff_time(Decimal::ZERO, dec!(12), dec!(100)).unwrap();
        assert_eq!(months, 0);
        assert_eq!(interest, Decimal::ZERO);
    }

    #[test]
    fn payoff_time_handles_zero_rate() {
        let (months, interest) =
            DebtService::calculate_payoff_time(dec!(1200), Decimal::ZERO, dec!(100)).unwrap();
        assert_eq!(months, 12);
        assert_eq!(interest, Decimal::ZERO);
    }

    #[test]
    fn payment_split_takes_interest_first() {
        let (principal, interest) = DebtService::payment_split(dec!(1000), dec!(12), dec!(50));
        assert_eq!(principal, dec!(40.00));
        assert_eq!(interest, dec!(10.00));
    }

    #[test]
    fn payment_split_caps_interest_at_payment() {
        let (principal, interest) = DebtService::payment_split(dec!(10000), dec!(24), dec!(100));
        assert_eq!(principal, Decimal::ZERO);
        assert_eq!(interest, dec!(100));
    }

    #[test]
    fn payment_split_caps_principal_at_balance() {
        let (principal, interest) = DebtService::payment_split(dec!(50), dec!(12), dec!(100));
        assert_eq!(principal, dec!(50.00));
        assert_eq!(interest, dec!(50.00));
    }

    #[test]
    fn interest_breakdown_covers_first_year() {
        let breakdown = DebtService::interest_breakdown(dec!(5000), dec!(15), dec!(200)).unwrap();
        assert_eq!(breakdown.monthly_breakdown.len(), 12);
        assert!(breakdown.months_to_payoff > 12);

        let first = &breakdown.monthly_breakdown[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.interest, dec!(62.50));
        assert_eq!(first.principal, dec!(137.50));

        // Interest shrinks as the balance comes down.
        let last = breakdown.monthly_breakdown.last().unwrap();
        assert!(last.interest < first.interest);
        assert_eq!(
            breakdown.total_payments,
            dec!(200) * Decimal::from(breakdown.months_to_payoff)
        );
        assert!(breakdown.interest_percentage > Decimal::ZERO);
    }

    #[test]
    fn interest_breakdown_rejects_hopeless_payment() {
        let err = DebtService::interest_breakdown(dec!(5000), dec!(15), dec!(50)).expect_err(
            "payment below monthly interest should be rejected",
        );
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn snowball_orders_by_balance() {
        let mut profile = base_profile();
        profile.add_debt(sample_debt("Large", dec!(10000), dec!(10), dec!(200)));
        profile.add_debt(sample_debt("Small", dec!(1000), dec!(15), dec!(50)));
        profile.add_debt(sample_debt("Medium", dec!(5000), dec!(20), dec!(100)));

        let plan = DebtService::generate_payoff_plan(
            &profile,
            PayoffStrategy::Snowball,
            dec!(100),
            None,
            date(2024, 6, 1),
        );

        let names: Vec<&str> = plan.debts.iter().map(|d| d.debt_name.as_str()).collect();
        assert_eq!(names, vec!["Small", "Medium", "Large"]);
        assert_eq!(plan.debts[0].payoff_order, 1);
        assert!(plan.total_months > 0);
        assert!(plan.debt_free_date > date(2024, 6, 1));
        assert!(plan.interest_saved >= Decimal::ZERO);
    }

    #[test]
    fn avalanche_orders_by_rate() {
        let mut profile = base_profile();
        profile.add_debt(sample_debt("Low", dec!(2000), dec!(8), dec!(100)));
        profile.add_debt(sample_debt("High", dec!(3000), dec!(24), dec!(150)));
        profile.add_debt(sample_debt("Mid", dec!(1000), dec!(15), dec!(50)));

        let plan = DebtService::generate_payoff_plan(
            &profile,
            PayoffStrategy::Avalanche,
            dec!(50),
            None,
            date(2024, 6, 1),
        );

        let names: Vec<&str> = plan.debts.iter().map(|d| d.debt_name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn payoff_plan_without_debts_is_empty() {
        let profile = base_profile();
        let plan = DebtService::generate_payoff_plan(
            &profile,
            PayoffStrategy::Snowball,
            dec!(100),
            None,
            date(2024, 6, 1),
        );
        assert!(plan.debts.is_empty());
        assert_eq!(plan.total_months, 0);
        assert_eq!(plan.debt_free_date, date(2024, 6, 1));
        assert_eq!(plan.interest_saved, Decimal::ZERO);
    }

    #[test]
    fn payoff_plan_respects_debt_filter() {
        let mut profile = base_profile();
        let first = profile.add_debt(sample_debt("First", dec!(1000), dec!(10), dec!(50)));
        profile.add_debt(sample_debt("Second", dec!(2000), dec!(10), dec!(50)));

        let plan = DebtService::generate_payoff_plan(
            &profile,
            PayoffStrategy::Snowball,
            Decimal::ZERO,
            Some(&[first]),
            date(2024, 6, 1),
        );
        assert_eq!(plan.debts.len(), 1);
        assert_eq!(plan.debts[0].debt_id, first);
    }

    #[test]
    fn payoff_plan_skips_hopeless_debts() {
        let mut profile = base_profile();
        // 100/month exactly covers interest on the second debt.
        profile.add_debt(sample_debt("Payable", dec!(1000), dec!(12), dec!(100)));
        profile.add_debt(sample_debt("Hopeless", dec!(10000), dec!(12), dec!(100)));

        let plan = DebtService::generate_payoff_plan(
            &profile,
            PayoffStrategy::Avalanche,
            Decimal::ZERO,
            None,
            date(2024, 6, 1),
        );
        assert_eq!(plan.debts.len(), 1);
        assert_eq!(plan.debts[0].debt_name, "Payable");
    }

    #[test]
    fn record_payment_splits_principal_and_interest() {
        let mut profile = base_profile();
        let id = profile.add_debt(sample_debt("Card", dec!(2000), dec!(18), dec!(50)));

        let payment =
            DebtService::record_payment(&mut profile, id, dec!(500), date(2024, 6, 15), false, None)
                .unwrap();
        assert_eq!(payment.interest_amount, dec!(30.00));
        assert_eq!(payment.principal_amount, dec!(470.00));

        let debt = profile.debt(id).unwrap();
        assert_eq!(debt.current_balance, dec!(1530.00));
        assert_eq!(debt.payments.len(), 1);
    }

    #[test]
    fn record_payment_retires_debt_at_zero() {
        let mut profile = base_profile();
        let id = profile.add_debt(sample_debt("Almost done", dec!(100), dec!(12), dec!(25)));

        DebtService::record_payment(&mut profile, id, dec!(101), date(2024, 6, 15), true, None)
            .unwrap();
        let debt = profile.debt(id).unwrap();
        assert_eq!(debt.current_balance, Decimal::ZERO);
        assert_eq!(debt.status, DebtStatus::PaidOff);

        let err = DebtService::record_payment(
            &mut profile,
            id,
            dec!(10),
            date(2024, 6, 16),
            false,
            None,
        )
        .expect_err("paid off debt should reject further payments");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn record_payment_validates_amount_and_debt() {
        let mut profile = base_profile();
        let id = profile.add_debt(sample_debt("Card", dec!(500), dec!(10), dec!(25)));

        let err =
            DebtService::record_payment(&mut profile, id, Decimal::ZERO, date(2024, 6, 1), false, None)
                .expect_err("zero payment");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let err = DebtService::record_payment(
            &mut profile,
            Uuid::new_v4(),
            dec!(10),
            date(2024, 6, 1),
            false,
            None,
        )
        .expect_err("unknown debt");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn summary_aggregates_active_debts() {
        let mut profile = base_profile();
        profile.add_debt(sample_debt("Card", dec!(1000), dec!(20), dec!(50)));
        let mut loan = sample_debt("Loan", dec!(3000), dec!(10), dec!(100));
        loan.kind = DebtKind::PersonalLoan;
        profile.add_debt(loan);
        let mut done = sample_debt("Old card", dec!(500), dec!(15), dec!(25));
        done.status = DebtStatus::PaidOff;
        done.current_balance = Decimal::ZERO;
        profile.add_debt(done);

        let summary = DebtService::summary(&profile);
        assert_eq!(summary.total_debt, dec!(4000));
        assert_eq!(summary.total_original_debt, dec!(4500));
        assert_eq!(summary.active_debt_count, 2);
        assert_eq!(summary.paid_off_debt_count, 1);
        assert_eq!(summary.total_minimum_payment, dec!(150));
        // (20 * 1000 + 10 * 3000) / 4000 = 12.5
        assert_eq!(summary.average_interest_rate, dec!(12.50));
        assert_eq!(summary.debts_by_kind[&DebtKind::CreditCard], 2);
        assert_eq!(summary.debts_by_kind[&DebtKind::PersonalLoan], 1);
    }

    #[test]
    fn add_rejects_invalid_fields() {
        let mut profile = base_profile();

        let negative_rate = sample_debt("Bad rate", dec!(100), dec!(-1), dec!(10));
        let err = DebtService::add(&mut profile, negative_rate).expect_err("negative rate");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let mut over_balance = sample_debt("Over", dec!(100), dec!(10), dec!(10));
        over_balance.current_balance = dec!(200);
        let err = DebtService::add(&mut profile, over_balance).expect_err("balance over original");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let mut bad_day = sample_debt("Day", dec!(100), dec!(10), dec!(10));
        bad_day.due_day = Some(32);
        let err = DebtService::add(&mut profile, bad_day).expect_err("due day out of range");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn remove_soft_deletes() {
        let mut profile = base_profile();
        let id = profile.add_debt(sample_debt("Card", dec!(100), dec!(10), dec!(10)));

        DebtService::remove(&mut profile, id).unwrap();
        assert!(DebtService::list(&profile, false, None).is_empty());
        assert_eq!(DebtService::list(&profile, true, None).len(), 1);
    }

    #[test]
    fn list_filters_by_kind() {
        let mut profile = base_profile();
        profile.add_debt(sample_debt("Card", dec!(100), dec!(10), dec!(10)));
        let mut loan = sample_debt("Loan", dec!(200), dec!(5), dec!(20));
        loan.kind = DebtKind::StudentLoan;
        profile.add_debt(loan);

        let cards = DebtService::list(&profile, false, Some(&DebtKind::CreditCard));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Card");
    }
}
