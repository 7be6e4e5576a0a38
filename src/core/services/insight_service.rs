//! Forecasting, anomaly detection, and generated insights.
//!
//! Forecasts are statistical rather than learned: monthly expense totals
//! feed a least-squares trend, anomalies come from per-category z-scores,
//! and cash flow is a daily balance walk with bi-weekly income applied.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Cadence, CashflowForecast, Insight, InsightKind, InsightSeverity, InsightStatus, Profile,
    ScheduledBill, SpendingAnomaly, SpendingForecast, Transaction, TrendDirection,
};

use super::{ServiceError, ServiceResult};

/// Days of history behind a spending forecast.
const FORECAST_HISTORY_DAYS: i64 = 365;
/// Average month length used to scale monthly figures to arbitrary windows.
const AVG_DAYS_PER_MONTH: f64 = 30.44;
/// Z multiplier for the 95% confidence interval.
const CONFIDENCE_Z: f64 = 1.96;
/// Z-score above which a transaction is flagged as anomalous.
const ANOMALY_Z_THRESHOLD: f64 = 2.5;
/// Default lookback window for anomaly detection.
pub const DEFAULT_ANOMALY_LOOKBACK_DAYS: i64 = 90;

/// Point-in-time rollup backing a dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInsights {
    pub current_month_spending: Decimal,
    pub predicted_month_end: Decimal,
    pub spending_trend: TrendDirection,
    pub trend_percentage: f64,
    pub budgets_at_risk: usize,
    pub projected_overages: Vec<BudgetOverage>,
    pub recent_anomalies: Vec<SpendingAnomaly>,
    pub active_insights: Vec<Insight>,
    pub critical_alerts: usize,
    pub warning_alerts: usize,
    pub total_potential_savings: Decimal,
    pub top_savings_opportunities: Vec<SavingsOpportunity>,
    pub current_balance: Decimal,
    pub predicted_7_day_balance: Decimal,
    pub predicted_30_day_balance: Decimal,
    pub low_balance_warning: Option<LowBalanceWarning>,
}

/// Budget whose current period has already been overspent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetOverage {
    pub budget_name: String,
    pub overage_amount: Decimal,
    pub usage_percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub title: String,
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowBalanceWarning {
    pub expected_on: Option<NaiveDate>,
    pub minimum_balance: Decimal,
    pub risk: f64,
}

struct RecurringPattern {
    amount: Decimal,
    interval_days: f64,
}

pub struct InsightService;

impl InsightService {
    /// Predicts spending over `[start, end]` from up to a year of history
    /// before `start`. With three or more months of data the forecast
    /// extrapolates the recent monthly trend; with less it falls back to
    /// the historical average.
    pub fn spending_forecast(
        profile: &Profile,
        start: NaiveDate,
        end: NaiveDate,
        category_id: Option<Uuid>,
    ) -> ServiceResult<SpendingForecast> {
        if end < start {
            return Err(ServiceError::Invalid(
                "Forecast window ends before it starts".into(),
            ));
        }

        let history_start = start - Duration::days(FORECAST_HISTORY_DAYS);
        let history: Vec<&Transaction> = profile
            .transactions
            .iter()
            .filter(|txn| txn.is_expense())
            .filter(|txn| txn.occurred_on >= history_start && txn.occurred_on < start)
            .filter(|txn| category_id.map_or(true, |id| txn.category_id == Some(id)))
            .collect();

        if history.is_empty() {
            return Ok(SpendingForecast {
                category_id,
                period_start: start,
                period_end: end,
                predicted_amount: Decimal::ZERO,
                lower_bound: Decimal::ZERO,
                upper_bound: Decimal::ZERO,
                confidence: 0.0,
                historical_average: Decimal::ZERO,
                trend: TrendDirection::Stable,
                trend_percentage: 0.0,
            });
        }

        let amounts: Vec<f64> = history.iter().map(|txn| decimal_to_f64(txn.amount)).collect();
        let historical_avg = mean(&amounts);
        let historical_std = std_dev(&amounts);

        let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for txn in &history {
            let key = (txn.occurred_on.year(), txn.occurred_on.month());
            *monthly.entry(key).or_insert(0.0) += decimal_to_f64(txn.amount);
        }
        let monthly_totals: Vec<f64> = monthly.values().copied().collect();

        let days_in_period = (end - start).num_days() + 1;
        let scale = days_in_period as f64 / AVG_DAYS_PER_MONTH;

        if monthly_totals.len() >= 3 {
            let recent = &monthly_totals[monthly_totals.len() - 3..];
            let trend = linear_slope(recent);
            let months_ahead = (end.year() - start.year()) * 12
                + (end.month() as i32 - start.month() as i32)
                + 1;
            let predicted_monthly = recent[recent.len() - 1] + trend * f64::from(months_ahead);
            let predicted_amount = decimal_from_f64(predicted_monthly * scale);

            let confidence = if historical_std > 0.0 {
                (1.0 - historical_std / historical_avg).clamp(0.0, 1.0)
            } else {
                0.95
            };
            let std_error = historical_std / (amounts.len() as f64).sqrt();
            let margin = decimal_from_f64(CONFIDENCE_Z * std_error * scale);

            let (trend_direction, trend_percentage) = if trend > 0.1 * historical_avg {
                (TrendDirection::Increasing, trend / historical_avg * 100.0)
            } else if trend < -0.1 * historical_avg {
                (TrendDirection::Decreasing, trend / historical_avg * 100.0)
            } else {
                (TrendDirection::Stable, 0.0)
            };

            Ok(SpendingForecast {
                category_id,
                period_start: start,
                period_end: end,
                predicted_amount,
                lower_bound: (predicted_amount - margin).max(Decimal::ZERO),
                upper_bound: predicted_amount + margin,
                confidence,
                historical_average: decimal_from_f64(historical_avg),
                trend: trend_direction,
                trend_percentage,
            })
        } else {
            let predicted_amount = decimal_from_f64(historical_avg);
            Ok(SpendingForecast {
                category_id,
                period_start: start,
                period_end: end,
                predicted_amount,
                lower_bound: predicted_amount * dec!(0.8),
                upper_bound: predicted_amount * dec!(1.2),
                confidence: 0.5,
                historical_average: predicted_amount,
                trend: TrendDirection::Stable,
                trend_percentage: 0.0,
            })
        }
    }

    /// Projects the account balance forward to `forecast_date`. Income is
    /// inferred from recurring patterns in the last ninety days, expenses
    /// come from the spending forecast spread evenly per day.
    pub fn cashflow_forecast(
        profile: &Profile,
        forecast_date: NaiveDate,
        account: Option<&str>,
        today: NaiveDate,
    ) -> ServiceResult<CashflowForecast> {
        if forecast_date < today {
            return Err(ServiceError::Invalid("Forecast date is in the past".into()));
        }

        let matches_account = |txn: &Transaction| {
            account.map_or(true, |name| {
                txn.account
                    .as_deref()
                    .map_or(false, |candidate| candidate.eq_ignore_ascii_case(name))
            })
        };

        let mut current_balance = Decimal::ZERO;
        for txn in &profile.transactions {
            if txn.occurred_on > today || !matches_account(txn) {
                continue;
            }
            if txn.is_income() {
                current_balance += txn.amount;
            } else if txn.is_expense() {
                current_balance -= txn.amount;
            }
        }

        let days_ahead = (forecast_date - today).num_days();

        let income_cutoff = today - Duration::days(90);
        let income: Vec<&Transaction> = profile
            .transactions
            .iter()
            .filter(|txn| txn.is_income())
            .filter(|txn| txn.occurred_on >= income_cutoff)
            .filter(|txn| matches_account(txn))
            .collect();
        let patterns = Self::recurring_patterns(&income);
        let projected_income = Self::project_recurring(&patterns, days_ahead);

        let spending = Self::spending_forecast(profile, today, forecast_date, None)?;
        let projected_expenses = spending.predicted_amount;
        let projected_balance = current_balance + projected_income - projected_expenses;

        // Daily walk to find the lowest point, assuming bi-weekly paydays.
        let daily_expenses = projected_expenses / Decimal::from(days_ahead.max(1));
        let mut running = current_balance;
        let mut minimum_balance = current_balance;
        let mut low_balance_date = None;
        for day in 1..=days_ahead {
            running -= daily_expenses;
            if day % 14 == 0 {
                running += projected_income / dec!(2);
            }
            if running < minimum_balance {
                minimum_balance = running;
                low_balance_date = Some(today + Duration::days(day));
            }
        }

        let overdraft_risk = if minimum_balance < Decimal::ZERO {
            1.0
        } else if minimum_balance < current_balance * dec!(0.1) {
            0.7
        } else if minimum_balance < current_balance * dec!(0.2) {
            0.3
        } else {
            0.0
        };

        let scheduled_bills = profile
            .transactions
            .iter()
            .filter(|txn| txn.is_recurring && txn.is_expense())
            .map(|txn| ScheduledBill {
                description: txn.description.clone(),
                amount: txn.amount,
                merchant: txn.merchant.clone(),
            })
            .collect();

        Ok(CashflowForecast {
            forecast_date,
            current_balance,
            projected_income,
            projected_expenses,
            projected_balance,
            minimum_balance,
            low_balance_date,
            overdraft_risk,
            scheduled_bills,
        })
    }

    /// Flags expenses that sit far outside their category's recent
    /// distribution. Returned anomalies are ordered worst first.
    pub fn detect_anomalies(
        profile: &Profile,
        lookback_days: i64,
        today: NaiveDate,
    ) -> Vec<SpendingAnomaly> {
        let cutoff = today - Duration::days(lookback_days);
        let mut groups: HashMap<Option<Uuid>, Vec<&Transaction>> = HashMap::new();
        for txn in &profile.transactions {
            if txn.is_expense() && txn.occurred_on >= cutoff {
                groups.entry(txn.category_id).or_default().push(txn);
            }
        }

        let mut anomalies = Vec::new();
        for group in groups.values() {
            if group.len() < 3 {
                continue;
            }
            let amounts: Vec<f64> = group.iter().map(|txn| decimal_to_f64(txn.amount)).collect();
            let mu = mean(&amounts);
            let sigma = std_dev(&amounts);
            if sigma == 0.0 {
                continue;
            }
            for txn in group {
                let score = (decimal_to_f64(txn.amount) - mu).abs() / sigma;
                if score > ANOMALY_Z_THRESHOLD {
                    anomalies.push(SpendingAnomaly {
                        transaction_id: txn.id,
                        category_id: txn.category_id,
                        occurred_on: txn.occurred_on,
                        amount: txn.amount,
                        expected_min: decimal_from_f64((mu - 2.0 * sigma).max(0.0)),
                        expected_max: decimal_from_f64(mu + 2.0 * sigma),
                        score,
                        confidence: (score / 4.0).min(0.99),
                        merchant: txn.merchant.clone(),
                    });
                }
            }
        }
        anomalies.sort_by(|a, b| b.score.total_cmp(&a.score));
        anomalies
    }

    /// Runs every insight generator and replaces the profile's active
    /// insights with the fresh batch. Insights already acknowledged,
    /// dismissed, or resolved are kept.
    pub fn generate_insights(
        profile: &mut Profile,
        today: NaiveDate,
    ) -> ServiceResult<Vec<Insight>> {
        let mut generated = Vec::new();
        generated.extend(Self::spending_trend_insight(profile, today));
        generated.extend(Self::budget_pace_insights(profile, today));
        generated.extend(Self::anomaly_cluster_insight(profile, today));
        generated.extend(Self::cashflow_insight(profile, today)?);

        profile.insights.retain(|insight| !insight.is_active());
        profile.insights.extend(generated.iter().cloned());
        profile.touch();
        Ok(generated)
    }

    pub fn active_insights(profile: &Profile) -> Vec<&Insight> {
        profile
            .insights
            .iter()
            .filter(|insight| insight.is_active())
            .collect()
    }

    pub fn acknowledge(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        Self::set_status(profile, id, InsightStatus::Acknowledged)
    }

    pub fn dismiss(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        Self::set_status(profile, id, InsightStatus::Dismissed)
    }

    pub fn resolve(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        Self::set_status(profile, id, InsightStatus::Resolved)
    }

    /// Everything a dashboard needs in one pass: month-to-date spending,
    /// the month-end forecast, budget risk, anomalies, and cash flow.
    pub fn dashboard(profile: &Profile, today: NaiveDate) -> ServiceResult<DashboardInsights> {
        let month_start = today.with_day(1).unwrap_or(today);
        let month_end = Cadence::Monthly.period_end(month_start);

        let current_month_spending: Decimal = profile
            .transactions
            .iter()
            .filter(|txn| txn.is_expense() && txn.occurred_on >= month_start)
            .map(|txn| txn.amount)
            .sum();

        let forecast = Self::spending_forecast(profile, month_start, month_end, None)?;

        let active_insights: Vec<Insight> = profile
            .insights
            .iter()
            .filter(|insight| insight.is_active())
            .cloned()
            .collect();

        let recent_cutoff = today - Duration::days(7);
        let recent_anomalies: Vec<SpendingAnomaly> =
            Self::detect_anomalies(profile, DEFAULT_ANOMALY_LOOKBACK_DAYS, today)
                .into_iter()
                .filter(|anomaly| anomaly.occurred_on >= recent_cutoff)
                .take(5)
                .collect();

        let mut budgets_at_risk = 0;
        let mut projected_overages = Vec::new();
        for budget in profile.budgets.iter().filter(|budget| budget.is_active) {
            let Some(period) = budget.period_containing(today) else {
                continue;
            };
            if period.total_amount <= Decimal::ZERO {
                continue;
            }
            let usage_pct = period.spent_amount / period.total_amount * dec!(100);
            if usage_pct > dec!(80) {
                budgets_at_risk += 1;
                if usage_pct > dec!(100) {
                    projected_overages.push(BudgetOverage {
                        budget_name: budget.name.clone(),
                        overage_amount: period.spent_amount - period.total_amount,
                        usage_percentage: usage_pct.round_dp(1),
                    });
                }
            }
        }

        let mut savings: Vec<&Insight> = active_insights
            .iter()
            .filter(|insight| {
                insight
                    .potential_savings
                    .map_or(false, |amount| amount > Decimal::ZERO)
            })
            .collect();
        savings.sort_by(|a, b| {
            b.potential_savings
                .unwrap_or(Decimal::ZERO)
                .cmp(&a.potential_savings.unwrap_or(Decimal::ZERO))
        });
        let total_potential_savings: Decimal = savings
            .iter()
            .filter_map(|insight| insight.potential_savings)
            .sum();
        let top_savings_opportunities = savings
            .iter()
            .take(3)
            .map(|insight| SavingsOpportunity {
                title: insight.title.clone(),
                amount: insight.potential_savings.unwrap_or(Decimal::ZERO),
                description: insight.description.clone(),
            })
            .collect();

        let cashflow_7d =
            Self::cashflow_forecast(profile, today + Duration::days(7), None, today)?;
        let cashflow_30d =
            Self::cashflow_forecast(profile, today + Duration::days(30), None, today)?;
        let low_balance_warning = if cashflow_30d.overdraft_risk > 0.3 {
            Some(LowBalanceWarning {
                expected_on: cashflow_30d.low_balance_date,
                minimum_balance: cashflow_30d.minimum_balance,
                risk: cashflow_30d.overdraft_risk,
            })
        } else {
            None
        };

        let critical_alerts = active_insights
            .iter()
            .filter(|insight| insight.severity == InsightSeverity::Critical)
            .count();
        let warning_alerts = active_insights
            .iter()
            .filter(|insight| insight.severity == InsightSeverity::Warning)
            .count();

        Ok(DashboardInsights {
            current_month_spending,
            predicted_month_end: forecast.predicted_amount,
            spending_trend: forecast.trend,
            trend_percentage: forecast.trend_percentage,
            budgets_at_risk,
            projected_overages,
            recent_anomalies,
            active_insights,
            critical_alerts,
            warning_alerts,
            total_potential_savings,
            top_savings_opportunities,
            current_balance: cashflow_7d.current_balance,
            predicted_7_day_balance: cashflow_7d.projected_balance,
            predicted_30_day_balance: cashflow_30d.projected_balance,
            low_balance_warning,
        })
    }

    /// Month-to-date spending against last month's full total.
    fn spending_trend_insight(profile: &Profile, today: NaiveDate) -> Option<Insight> {
        let month_start = today.with_day(1).unwrap_or(today);
        let current: Decimal = profile
            .transactions
            .iter()
            .filter(|txn| txn.is_expense() && txn.occurred_on >= month_start)
            .map(|txn| txn.amount)
            .sum();

        let last_month_end = month_start - Duration::days(1);
        let last_month_start = last_month_end.with_day(1).unwrap_or(last_month_end);
        let last_month: Decimal = profile
            .transactions
            .iter()
            .filter(|txn| txn.is_expense())
            .filter(|txn| {
                txn.occurred_on >= last_month_start && txn.occurred_on <= last_month_end
            })
            .map(|txn| txn.amount)
            .sum();

        if last_month == Decimal::ZERO {
            return None;
        }
        let change_pct = (current - last_month) / last_month * dec!(100);
        if change_pct.abs() <= dec!(20) {
            return None;
        }

        let insight = if change_pct > Decimal::ZERO {
            Insight::new(
                InsightKind::SpendingForecast,
                InsightSeverity::Warning,
                "Spending Increase Detected",
                format!(
                    "Your spending this month is {}% higher than last month.",
                    change_pct.round_dp(1)
                ),
            )
            .with_recommendation(
                "Review your recent expenses to identify areas where you can cut back.",
            )
        } else {
            Insight::new(
                InsightKind::SpendingForecast,
                InsightSeverity::Success,
                "Great Job on Spending Reduction!",
                format!(
                    "Your spending this month is {}% lower than last month.",
                    change_pct.abs().round_dp(1)
                ),
            )
            .with_recommendation(
                "Keep up the good work! Consider putting the savings toward your financial goals.",
            )
        };

        Some(
            insight
                .with_action_items(vec![
                    "Review transaction history".into(),
                    "Update budget if needed".into(),
                    "Set spending alerts".into(),
                ])
                .with_potential_savings((current - last_month).max(Decimal::ZERO))
                .with_valid_until(month_start + Duration::days(30)),
        )
    }

    /// Flags budgets whose usage is running ahead of the period calendar.
    fn budget_pace_insights(profile: &Profile, today: NaiveDate) -> Vec<Insight> {
        let mut insights = Vec::new();
        for budget in profile.budgets.iter().filter(|budget| budget.is_active) {
            let Some(period) = budget.period_containing(today) else {
                continue;
            };
            if period.total_amount <= Decimal::ZERO {
                continue;
            }
            let usage_pct = period.spent_amount / period.total_amount * dec!(100);
            let period_days = Decimal::from(period.length_days());
            let elapsed_days = Decimal::from((today - period.starts_on).num_days() + 1);
            let progress_pct = elapsed_days / period_days * dec!(100);

            // 10 point tolerance before calling the pace a problem.
            if usage_pct <= progress_pct + dec!(10) {
                continue;
            }
            let pace_ratio = usage_pct / progress_pct;
            let projected_overage = pace_ratio * period.total_amount - period.total_amount;
            let severity = if usage_pct < dec!(90) {
                InsightSeverity::Warning
            } else {
                InsightSeverity::Critical
            };
            let remaining_days = Decimal::from((period.ends_on - today).num_days() + 1);
            let daily_allowance = (period.remaining_amount / remaining_days).round_dp(2);

            insights.push(
                Insight::new(
                    InsightKind::BudgetProjection,
                    severity,
                    format!("Budget Alert: {}", budget.name),
                    format!(
                        "You've used {}% of your budget but are only {}% through the period.",
                        usage_pct.round_dp(1),
                        progress_pct.round_dp(1)
                    ),
                )
                .with_budget(budget.id)
                .with_recommendation(format!(
                    "Reduce spending to stay within budget. Aim to spend no more than {daily_allowance} per day."
                ))
                .with_action_items(vec![
                    "Review recent transactions".into(),
                    "Identify non-essential expenses".into(),
                    "Consider adjusting budget if unrealistic".into(),
                ])
                .with_potential_savings(projected_overage)
                .with_risk_score(decimal_to_f64(usage_pct / dec!(100)).min(1.0))
                .with_valid_until(period.ends_on),
            );
        }
        insights
    }

    /// A cluster of strong anomalies in the past week becomes one insight.
    fn anomaly_cluster_insight(profile: &Profile, today: NaiveDate) -> Option<Insight> {
        let recent_cutoff = today - Duration::days(7);
        let clustered: Vec<SpendingAnomaly> =
            Self::detect_anomalies(profile, DEFAULT_ANOMALY_LOOKBACK_DAYS, today)
                .into_iter()
                .filter(|anomaly| anomaly.occurred_on >= recent_cutoff && anomaly.score > 3.0)
                .collect();
        if clustered.len() < 3 {
            return None;
        }
        let transaction_ids = clustered
            .iter()
            .map(|anomaly| anomaly.transaction_id)
            .collect();
        Some(
            Insight::new(
                InsightKind::AnomalyDetection,
                InsightSeverity::Warning,
                "Multiple Unusual Transactions Detected",
                format!(
                    "We've detected {} unusually high transactions in the past week.",
                    clustered.len()
                ),
            )
            .with_transactions(transaction_ids)
            .with_recommendation(
                "Review these transactions to ensure they're legitimate and update your budget if needed.",
            )
            .with_action_items(vec![
                "Verify transaction legitimacy".into(),
                "Update category budgets if needed".into(),
                "Set up alerts for large transactions".into(),
            ])
            .with_risk_score(0.7)
            .with_valid_until(today + Duration::days(7)),
        )
    }

    /// Warns when the thirty-day balance walk risks running dry.
    fn cashflow_insight(profile: &Profile, today: NaiveDate) -> ServiceResult<Option<Insight>> {
        let forecast =
            Self::cashflow_forecast(profile, today + Duration::days(30), None, today)?;
        if forecast.overdraft_risk <= 0.5 {
            return Ok(None);
        }
        let days_until_low = forecast
            .low_balance_date
            .map_or(0, |date| (date - today).num_days());
        let severity = if forecast.overdraft_risk > 0.8 {
            InsightSeverity::Critical
        } else {
            InsightSeverity::Warning
        };
        let insight = Insight::new(
            InsightKind::CashflowForecast,
            severity,
            "Cash Flow Warning",
            format!(
                "Your account balance may run low in {days_until_low} days based on current spending patterns."
            ),
        )
        .with_recommendation(
            "Consider reducing non-essential expenses or increasing income to maintain a healthy balance.",
        )
        .with_action_items(vec![
            "Review upcoming bills".into(),
            "Postpone non-essential purchases".into(),
            "Set up balance alerts".into(),
        ])
        .with_risk_score(forecast.overdraft_risk)
        .with_valid_until(forecast.low_balance_date.unwrap_or(today + Duration::days(7)));
        Ok(Some(insight))
    }

    /// Groups transactions by merchant and rounded amount; two or more
    /// occurrences make a recurring pattern with a mean interval.
    fn recurring_patterns(transactions: &[&Transaction]) -> Vec<RecurringPattern> {
        let mut groups: HashMap<(Option<String>, Decimal), Vec<NaiveDate>> = HashMap::new();
        for txn in transactions {
            let key = (txn.merchant.clone(), txn.amount.round_dp(2));
            groups.entry(key).or_default().push(txn.occurred_on);
        }

        let mut patterns = Vec::new();
        for ((_, amount), mut dates) in groups {
            if dates.len() < 2 {
                continue;
            }
            dates.sort();
            let intervals: Vec<f64> = dates
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).num_days() as f64)
                .collect();
            patterns.push(RecurringPattern {
                amount,
                interval_days: mean(&intervals),
            });
        }
        patterns
    }

    fn project_recurring(patterns: &[RecurringPattern], days_ahead: i64) -> Decimal {
        let mut total = Decimal::ZERO;
        for pattern in patterns {
            if pattern.interval_days > 0.0 {
                let occurrences = days_ahead as f64 / pattern.interval_days;
                total += pattern.amount * decimal_from_f64(occurrences);
            }
        }
        total
    }

    fn set_status(profile: &mut Profile, id: Uuid, status: InsightStatus) -> ServiceResult<()> {
        let insight = profile
            .insight_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("insight {id}")))?;
        insight.status = status;
        profile.touch();
        Ok(())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Least-squares slope of `values` against their indices.
fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, value) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (value - y_mean);
        denominator += dx * dx;
    }
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}
