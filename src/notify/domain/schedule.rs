//! Reminder schedule for approaching plan dates.

use chrono::{Days, NaiveDate};

/// Day offsets before the plan date at which reminders fire.
pub const REMINDER_OFFSETS: [u32; 4] = [0, 1, 3, 7];

/// Plan dates that are due for a reminder on `today`.
#[must_use]
pub fn reminder_dates(today: NaiveDate) -> Vec<NaiveDate> {
    REMINDER_OFFSETS
        .into_iter()
        .filter_map(|offset| today.checked_add_days(Days::new(u64::from(offset))))
        .collect()
}

/// Whole days from `today` until `plan_date`, `None` when already past.
#[must_use]
pub fn days_until(today: NaiveDate, plan_date: NaiveDate) -> Option<u32> {
    u32::try_from((plan_date - today).num_days()).ok()
}
