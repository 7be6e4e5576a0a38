use chrono::NaiveDate;
use debtwise::core::services::{BudgetService, InsightService};
use debtwise::domain::{
    Budget, Cadence, Category, InsightSeverity, Profile, Transaction, TransactionKind,
    TrendDirection,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn expense(
    profile: &mut Profile,
    category: Uuid,
    amount: Decimal,
    on: NaiveDate,
) -> Uuid {
    let txn = Transaction::new(amount, on, "expense", TransactionKind::Expense)
        .with_category(category);
    profile.add_transaction(txn)
}

fn income(profile: &mut Profile, amount: Decimal, on: NaiveDate) {
    let mut txn = Transaction::new(amount, on, "salary", TransactionKind::Income);
    txn.account = Some("Checking".into());
    profile.add_transaction(txn);
}

/// Two paychecks, steady groceries in May, heavier groceries in June,
/// and a June budget that is already 90% used on the 20th.
fn overextended_profile() -> (Profile, Uuid) {
    let mut profile = Profile::new("Insights");
    let groceries = profile.add_category(Category::new("Groceries", TransactionKind::Expense));

    income(&mut profile, dec!(3000), date(2024, 5, 1));
    income(&mut profile, dec!(3000), date(2024, 6, 1));
    expense(&mut profile, groceries, dec!(300), date(2024, 5, 10));
    expense(&mut profile, groceries, dec!(300), date(2024, 5, 20));
    expense(&mut profile, groceries, dec!(400), date(2024, 6, 5));
    expense(&mut profile, groceries, dec!(500), date(2024, 6, 12));

    let budget = Budget::new("Groceries", dec!(1000), Cadence::Monthly, date(2024, 6, 1))
        .with_category(groceries);
    BudgetService::add(&mut profile, budget).unwrap();
    (profile, groceries)
}

#[test]
fn sparse_history_forecast_falls_back_to_the_average() {
    let (profile, _) = overextended_profile();

    let forecast =
        InsightService::spending_forecast(&profile, date(2024, 7, 1), date(2024, 7, 31), None)
            .unwrap();

    // Only two months of history, so the forecast is the plain average
    // of the individual amounts with wide bounds.
    assert_eq!(forecast.predicted_amount, dec!(375));
    assert_eq!(forecast.lower_bound, dec!(300));
    assert_eq!(forecast.upper_bound, dec!(450));
    assert_eq!(forecast.historical_average, dec!(375));
    assert!((forecast.confidence - 0.5).abs() < f64::EPSILON);
    assert_eq!(forecast.trend, TrendDirection::Stable);
}

#[test]
fn cashflow_forecast_projects_paydays_and_daily_spend() {
    let (profile, _) = overextended_profile();
    let today = date(2024, 6, 20);

    let forecast =
        InsightService::cashflow_forecast(&profile, today + chrono::Duration::days(30), None, today)
            .unwrap();

    assert_eq!(forecast.current_balance, dec!(4500));
    assert_eq!(forecast.projected_expenses, dec!(375));
    // Monthly 3000 income spread over a 31 day observed interval.
    assert_eq!(forecast.projected_income.round_dp(2), dec!(2903.23));
    assert_eq!(forecast.projected_balance.round_dp(2), dec!(7028.23));
    // Lowest point lands the day before the first simulated payday.
    assert_eq!(forecast.minimum_balance, dec!(4337.5));
    assert_eq!(forecast.low_balance_date, Some(date(2024, 7, 3)));
    assert_eq!(forecast.overdraft_risk, 0.0);
    assert!(forecast.scheduled_bills.is_empty());
}

#[test]
fn outlier_purchases_surface_as_anomalies() {
    let mut profile = Profile::new("Anomalies");
    let groceries = profile.add_category(Category::new("Groceries", TransactionKind::Expense));

    for day in 0..15 {
        expense(
            &mut profile,
            groceries,
            dec!(100),
            date(2024, 4, 1) + chrono::Duration::days(day * 4),
        );
    }
    let outlier = expense(&mut profile, groceries, dec!(2000), date(2024, 6, 10));

    let anomalies = InsightService::detect_anomalies(&profile, 90, date(2024, 6, 15));
    assert_eq!(anomalies.len(), 1);
    let anomaly = &anomalies[0];
    assert_eq!(anomaly.transaction_id, outlier);
    assert_eq!(anomaly.amount, dec!(2000));
    assert!(anomaly.score > 2.5);
    assert!(anomaly.amount > anomaly.expected_max);
    assert!(anomaly.confidence > 0.9 && anomaly.confidence <= 0.99);
}

#[test]
fn generated_insights_flag_spending_jump_and_budget_pace() {
    let (mut profile, _) = overextended_profile();
    let today = date(2024, 6, 20);

    let generated = InsightService::generate_insights(&mut profile, today).unwrap();
    assert_eq!(generated.len(), 2);

    let trend = generated
        .iter()
        .find(|insight| insight.title == "Spending Increase Detected")
        .expect("trend insight");
    assert_eq!(trend.severity, InsightSeverity::Warning);
    assert_eq!(trend.potential_savings, Some(dec!(300)));
    assert_eq!(trend.valid_until, Some(date(2024, 7, 1)));

    let pace = generated
        .iter()
        .find(|insight| insight.title == "Budget Alert: Groceries")
        .expect("pace insight");
    // 90% used at two thirds of the month is critical.
    assert_eq!(pace.severity, InsightSeverity::Critical);
    assert_eq!(pace.valid_until, Some(date(2024, 6, 30)));
    assert_eq!(pace.risk_score, Some(0.9));
    assert_eq!(
        pace.potential_savings.map(|amount| amount.round_dp(2)),
        Some(dec!(350.00))
    );

    assert_eq!(profile.insights.len(), 2);
}

#[test]
fn regeneration_replaces_active_insights_but_keeps_acknowledged_ones() {
    let (mut profile, _) = overextended_profile();
    let today = date(2024, 6, 20);

    let first = InsightService::generate_insights(&mut profile, today).unwrap();
    let pace_id = first
        .iter()
        .find(|insight| insight.title.starts_with("Budget Alert"))
        .map(|insight| insight.id)
        .expect("pace insight");
    InsightService::acknowledge(&mut profile, pace_id).unwrap();

    let second = InsightService::generate_insights(&mut profile, today).unwrap();
    assert_eq!(second.len(), 2);
    // The acknowledged copy survives the replacement sweep.
    assert_eq!(profile.insights.len(), 3);
    assert_eq!(InsightService::active_insights(&profile).len(), 2);
}

#[test]
fn dashboard_collects_the_monthly_picture() {
    let (mut profile, _) = overextended_profile();
    let today = date(2024, 6, 20);
    InsightService::generate_insights(&mut profile, today).unwrap();

    let dashboard = InsightService::dashboard(&profile, today).unwrap();
    assert_eq!(dashboard.current_month_spending, dec!(900));
    assert_eq!(dashboard.current_balance, dec!(4500));
    assert_eq!(dashboard.budgets_at_risk, 1);
    assert!(dashboard.projected_overages.is_empty());
    assert_eq!(dashboard.active_insights, 2);
    assert_eq!(dashboard.critical_alerts, 1);
    assert_eq!(dashboard.warning_alerts, 1);
    assert_eq!(
        dashboard.total_potential_savings.round_dp(2),
        dec!(650.00)
    );
    assert_eq!(dashboard.top_savings_opportunities.len(), 2);
    assert_eq!(
        dashboard.top_savings_opportunities[0].amount.round_dp(2),
        dec!(350.00)
    );
    assert!(dashboard.low_balance_warning.is_none());
    assert!(dashboard.recent_anomalies.is_empty());
}
