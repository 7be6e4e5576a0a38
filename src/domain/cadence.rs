use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Budgeting cadence controlling how period boundaries are derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Cadence {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Cadence {
    /// Inclusive end date of a period starting at `start`.
    ///
    /// Month-based cadences clamp the day to the target month before
    /// stepping back one day, so a period starting Jan 31 ends Feb 27
    /// (Feb 28 in leap years).
    pub fn period_end(&self, start: NaiveDate) -> NaiveDate {
        match self {
            Cadence::Weekly => start + Duration::days(6),
            Cadence::Monthly => shift_month(start, 1) - Duration::days(1),
            Cadence::Quarterly => shift_month(start, 3) - Duration::days(1),
            Cadence::Yearly => shift_year(start, 1) - Duration::days(1),
        }
    }

}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Monthly
    }
}

/// Shifts a date by whole months, clamping the day to the target month.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

/// Shifts a date by whole years, clamping Feb 29 to Feb 28 off leap years.
pub fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let mut day = date.day();
    let month = date.month();
    day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}
