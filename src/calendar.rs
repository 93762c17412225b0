use chrono::{Months, NaiveDate};

use crate::errors::{Result, ScheduleError};

/// month arithmetic rule used for period boundaries and event dates
pub trait MonthCalendar {
    /// `date` shifted forward by `months`, `None` when out of range
    fn add_months(&self, date: NaiveDate, months: u32) -> Option<NaiveDate>;
}

/// clamp to the last valid day of the target month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndOfMonthClamp;

impl MonthCalendar for EndOfMonthClamp {
    fn add_months(&self, date: NaiveDate, months: u32) -> Option<NaiveDate> {
        date.checked_add_months(Months::new(months))
    }
}

/// add months using the given calendar, failing on overflow
pub fn shift_months<C: MonthCalendar + ?Sized>(
    calendar: &C,
    date: NaiveDate,
    months: u32,
) -> Result<NaiveDate> {
    calendar
        .add_months(date, months)
        .ok_or_else(|| ScheduleError::InvalidDate {
            message: format!("{} plus {} months is out of range", date, months),
        })
}

/// add months with the default end-of-month clamping rule
///
/// Jan 31 + 1 month is Feb 29 in a leap year and Feb 28 otherwise. Offsets
/// are always applied to the anchor date rather than chained, so a schedule
/// starting on the 31st returns to the 31st whenever the month allows it.
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    shift_months(&EndOfMonthClamp, date, months)
}
