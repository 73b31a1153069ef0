//! Budget-month and week windows.
//!
//! The budgeting month starts on a configurable day. In months shorter than
//! that day the start clamps to the month's last day, and every window ends
//! the day before the next window starts, so consecutive windows tile the
//! calendar without gaps or overlap.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodError {
    /// `month_start_day` outside `1..=31`.
    InvalidRange { month_start_day: u32 },
    /// The window would fall outside chrono's supported calendar.
    OutOfCalendar,
}

impl Display for PeriodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange { month_start_day } => {
                write!(f, "month start day {month_start_day} is outside 1..=31")
            }
            Self::OutOfCalendar => write!(f, "month window is outside the supported calendar"),
        }
    }
}

impl Error for PeriodError {}

/// Inclusive range of whole days forming one budgeting month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// Midnight at the start of the first day.
    pub fn start_at(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last representable instant of the final day.
    pub fn end_at(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::nanoseconds(1)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let day = at.date();
        day >= self.start && day <= self.end
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Resolves the budgeting month containing `today`.
///
/// - `today.day >= start day`: from the start day of this month to the day
///   before the start day of next month.
/// - otherwise: from the start day of last month to the day before this
///   month's start day.
pub fn month_window(month_start_day: u32, today: NaiveDate) -> Result<MonthWindow, PeriodError> {
    if !(1..=31).contains(&month_start_day) {
        return Err(PeriodError::InvalidRange { month_start_day });
    }

    let this_start = anchor(today.year(), today.month(), 0, month_start_day)?;
    let (start, next_start) = if today >= this_start {
        (
            this_start,
            anchor(today.year(), today.month(), 1, month_start_day)?,
        )
    } else {
        (
            anchor(today.year(), today.month(), -1, month_start_day)?,
            this_start,
        )
    };
    let end = next_start.pred_opt().ok_or(PeriodError::OutOfCalendar)?;

    Ok(MonthWindow { start, end })
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Start day in the month `month_offset` months away from `year`/`month`,
/// clamped to that month's length.
fn anchor(year: i32, month: u32, month_offset: i32, day: u32) -> Result<NaiveDate, PeriodError> {
    let (year, month) = shift_month(year, month, month_offset);
    let last_day = days_in_month(year, month).ok_or(PeriodError::OutOfCalendar)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last_day)).ok_or(PeriodError::OutOfCalendar)
}

fn shift_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + offset;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}
