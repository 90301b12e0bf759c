//! Drive date constraints.
//!
//! A drive must be scheduled at least [`MIN_LEAD_DAYS`] days ahead, measured from
//! the day the drive is created or edited. The dashboard treats enabled drives in
//! the next [`UPCOMING_WINDOW_DAYS`] days as upcoming.

use crate::errors::Rejection;
use chrono::{Days, NaiveDate, Utc};

/// Minimum number of days between today and a drive date.
pub const MIN_LEAD_DAYS: u64 = 15;

/// Length of the dashboard's upcoming-drive window, in days.
pub const UPCOMING_WINDOW_DAYS: u64 = 30;

/// Current UTC calendar day.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// First drive date accepted when scheduling on `today`.
#[must_use]
pub fn earliest_drive_date(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(MIN_LEAD_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Checks a drive date against the lead-time rule. The boundary day is accepted.
///
/// # Errors
/// Returns [`Rejection::DateTooSoon`] when `candidate` is earlier than
/// [`earliest_drive_date`].
pub fn validate_drive_date(candidate: NaiveDate, today: NaiveDate) -> Result<(), Rejection> {
    let earliest = earliest_drive_date(today);
    if candidate < earliest {
        return Err(Rejection::DateTooSoon { earliest });
    }
    Ok(())
}

/// Whether `date` falls in `[today, today + UPCOMING_WINDOW_DAYS]`.
#[must_use]
pub fn is_upcoming(date: NaiveDate, today: NaiveDate) -> bool {
    let window_end = today
        .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    date >= today && date <= window_end
}
