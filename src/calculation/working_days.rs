//! Working-day counting.
//!
//! Working days are the days an employee is expected at work: the range is
//! clipped to the date of joining, configured weekly off days are removed,
//! and holidays that cover the employee's department are counted separately
//! so payroll can pay them as present days.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{Employee, Holiday};

/// The working-day breakdown of a date range for one employee.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::WorkingDays;
///
/// let days = WorkingDays { gross: 26, holidays: 1, net: 25 };
/// assert_eq!(days.net, days.gross - days.holidays);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDays {
    /// Days after DOJ clipping that are not weekly off days.
    pub gross: u32,
    /// Applicable holidays falling on those days.
    pub holidays: u32,
    /// `gross - holidays`; the attendance denominator.
    pub net: u32,
}

/// Counts the working days of `employee` between `start` and `end` inclusive.
///
/// A range starting before the date of joining is clipped to it; a date of
/// joining after `end` yields zero. A single-day range returns one working
/// day when the employee had joined by that date, regardless of off days
/// and holidays.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::count_working_days;
/// use payroll_engine::models::Employee;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let employee = Employee::new(Uuid::new_v4(), Some("ENG-ASH-001".into()), "Asha", "Rao");
/// let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
///
/// // June 2025 has five Sundays.
/// let days = count_working_days(&employee, start, end, &[]);
/// assert_eq!(days.net, 25);
/// ```
pub fn count_working_days(
    employee: &Employee,
    start: NaiveDate,
    end: NaiveDate,
    holidays: &[Holiday],
) -> WorkingDays {
    if start == end {
        let net = u32::from(employee.has_joined_by(start));
        return WorkingDays {
            gross: net,
            holidays: 0,
            net,
        };
    }

    let start = match employee.date_of_joining {
        Some(doj) if doj > start => doj,
        _ => start,
    };
    if start > end {
        return WorkingDays::default();
    }

    let department = employee.department.as_deref();
    let mut days = WorkingDays::default();
    for date in start.iter_days().take_while(|d| *d <= end) {
        if employee.off_days.is_off(date.weekday()) {
            continue;
        }
        days.gross += 1;
        if holidays
            .iter()
            .any(|h| h.date == date && h.applies_to(department))
        {
            days.holidays += 1;
        }
    }
    days.net = days.gross - days.holidays;
    days
}

/// Calendar days of the month less Sundays.
///
/// Returns zero for an invalid month.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::working_days_in_month;
///
/// assert_eq!(working_days_in_month(2025, 6), 25);
/// assert_eq!(working_days_in_month(2025, 13), 0);
/// ```
pub fn working_days_in_month(year: i32, month: u32) -> u32 {
    let Some((first, last)) = month_bounds(year, month) else {
        return 0;
    };
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| d.weekday() != Weekday::Sun)
        .count() as u32
}

/// First and last date of a month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}
