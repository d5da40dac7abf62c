//! Calendar-aware billing period arithmetic.
//!
//! Month and year steps keep the day of month and time of day. When the target
//! month is shorter than the start day, the surplus days roll into the
//! following month (2024-01-31 + 1 month = 2024-03-02), the same way native
//! date objects normalise an out-of-range day.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

use super::enums::billing_cycles::BillingCycle;

/// Returns the occurrence `multiplier` billing periods after `start`.
///
/// `None` only when the result falls outside the range chrono can represent.
pub fn add_period(
    start: NaiveDateTime,
    cycle: BillingCycle,
    multiplier: u32,
) -> Option<NaiveDateTime> {
    let multiplier = i64::from(multiplier);
    match cycle {
        BillingCycle::Weekly => {
            let days = u64::try_from(7 * multiplier).ok()?;
            start.checked_add_days(Days::new(days))
        }
        BillingCycle::Monthly => add_months_overflowing(start, multiplier),
        BillingCycle::Quarterly => add_months_overflowing(start, 3 * multiplier),
        BillingCycle::Yearly => add_months_overflowing(start, 12 * multiplier),
    }
}

/// Date-only variant used for stored billing dates.
pub fn add_period_to_date(
    start: NaiveDate,
    cycle: BillingCycle,
    multiplier: u32,
) -> Option<NaiveDate> {
    add_period(start.and_time(NaiveTime::MIN), cycle, multiplier).map(|value| value.date())
}

/// Calendar days from `today` until `next_billing_date`; negative once overdue.
pub fn days_left(next_billing_date: NaiveDate, today: NaiveDate) -> i64 {
    (next_billing_date - today).num_days()
}

fn add_months_overflowing(start: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let month_index = i64::from(start.year()) * 12 + i64::from(start.month0()) + months;
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = u32::try_from(month_index.rem_euclid(12)).ok()? + 1;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first_of_month.checked_add_days(Days::new(u64::from(start.day() - 1)))?;

    Some(date.and_time(start.time()))
}
