//! Weekly absence penalty and weekly attendance bonus.
//!
//! Weeks run Monday to Sunday. Both rules only look at day-granular
//! attendance and only apply when the tenant enables them and the employee
//! has not opted out.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceStatus, DailyAttendanceRecord, Employee, WeeklyRuleSettings};

/// The Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Counts weekly penalty days over the records dated within `start..=end`.
///
/// Each week contributes exactly one penalty day when its unignored ABSENT
/// days reach the threshold; further absences in the same week add nothing.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::weekly_penalty_days;
/// use payroll_engine::models::{AttendanceStatus, DailyAttendanceRecord, WeeklyRuleSettings};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let tenant = Uuid::new_v4();
/// // Monday 2 June 2025 to Thursday 5 June 2025.
/// let records: Vec<_> = (2..=5)
///     .map(|d| {
///         let date = NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
///         DailyAttendanceRecord::new(tenant, "ENG-ASH-001", date, AttendanceStatus::Absent)
///     })
///     .collect();
/// let rules = WeeklyRuleSettings { penalty_enabled: true, absent_threshold: 4, bonus_enabled: false };
///
/// let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// assert_eq!(weekly_penalty_days(&records, &rules, true, start, end), 1);
/// assert_eq!(weekly_penalty_days(&records, &rules, false, start, end), 0);
/// ```
pub fn weekly_penalty_days<'a>(
    records: impl IntoIterator<Item = &'a DailyAttendanceRecord>,
    rules: &WeeklyRuleSettings,
    employee_rules_enabled: bool,
    start: NaiveDate,
    end: NaiveDate,
) -> u32 {
    if !rules.penalty_enabled || !employee_rules_enabled || rules.absent_threshold == 0 {
        return 0;
    }

    let mut absences: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for record in records {
        if record.date < start || record.date > end {
            continue;
        }
        if record.status == AttendanceStatus::Absent && !record.penalty_ignored {
            *absences.entry(week_start(record.date)).or_default() += 1;
        }
    }

    absences
        .values()
        .filter(|count| **count >= rules.absent_threshold)
        .count() as u32
}

/// Present days (Monday to Saturday) a week needs to earn the bonus.
///
/// The complement of the absence threshold, never below one.
pub fn bonus_present_threshold(absent_threshold: u32) -> u32 {
    7u32.saturating_sub(absent_threshold).max(1)
}

/// Why the weekly bonus was or was not granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum BonusDecision {
    /// Mark `date` PRESENT.
    Grant {
        /// The off day to mark present.
        date: NaiveDate,
    },
    /// Bonus disabled for the tenant or the employee.
    Disabled,
    /// The employee has no weekly off days.
    NoOffDays,
    /// Not enough present days Monday to Saturday.
    BelowThreshold {
        /// Present days counted.
        present: u32,
        /// Present days required.
        required: u32,
    },
    /// The off day precedes the date of joining.
    BeforeJoining,
    /// The off day is already PRESENT.
    AlreadyMarked,
}

/// Decides the weekly bonus for the week containing `date`.
///
/// `week_records` must hold the employee's records of that week; records
/// outside it are ignored. The bonus day is the first configured off day
/// scanning Monday to Sunday.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{evaluate_weekly_bonus, BonusDecision};
/// use payroll_engine::models::{AttendanceStatus, DailyAttendanceRecord, Employee, WeeklyRuleSettings};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let tenant = Uuid::new_v4();
/// let employee = Employee::new(tenant, Some("ENG-ASH-001".into()), "Asha", "Rao");
/// let records: Vec<_> = (2..=4)
///     .map(|d| {
///         let date = NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
///         DailyAttendanceRecord::new(tenant, "ENG-ASH-001", date, AttendanceStatus::Present)
///     })
///     .collect();
/// let rules = WeeklyRuleSettings { penalty_enabled: false, absent_threshold: 4, bonus_enabled: true };
///
/// let decision = evaluate_weekly_bonus(
///     &employee,
///     &rules,
///     NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
///     &records,
/// );
/// assert_eq!(
///     decision,
///     BonusDecision::Grant { date: NaiveDate::from_ymd_opt(2025, 6, 8).unwrap() }
/// );
/// ```
pub fn evaluate_weekly_bonus(
    employee: &Employee,
    rules: &WeeklyRuleSettings,
    date: NaiveDate,
    week_records: &[DailyAttendanceRecord],
) -> BonusDecision {
    if !rules.bonus_enabled || !employee.weekly_rules_enabled {
        return BonusDecision::Disabled;
    }
    let Some(first_off) = employee.off_days.off_weekdays().first().copied() else {
        return BonusDecision::NoOffDays;
    };

    let monday = week_start(date);
    let sunday = monday + Duration::days(6);
    let in_week = |r: &&DailyAttendanceRecord| r.date >= monday && r.date <= sunday;

    let present = week_records
        .iter()
        .filter(in_week)
        .filter(|r| r.date.weekday() != Weekday::Sun && r.status.is_full_presence())
        .count() as u32;
    let required = bonus_present_threshold(rules.absent_threshold);
    if present < required {
        return BonusDecision::BelowThreshold { present, required };
    }

    let bonus_date = monday + Duration::days(i64::from(first_off.num_days_from_monday()));
    if !employee.has_joined_by(bonus_date) {
        return BonusDecision::BeforeJoining;
    }
    let already_marked = week_records
        .iter()
        .filter(in_week)
        .any(|r| r.date == bonus_date && r.status == AttendanceStatus::Present);
    if already_marked {
        return BonusDecision::AlreadyMarked;
    }

    BonusDecision::Grant { date: bonus_date }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeeklyOffDays;
    use uuid::Uuid;

    const EMP: &str = "ENG-ASH-001";

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn record(d: u32, status: AttendanceStatus) -> DailyAttendanceRecord {
        DailyAttendanceRecord::new(Uuid::nil(), EMP, date(d), status)
    }

    fn penalty_rules(threshold: u32) -> WeeklyRuleSettings {
        WeeklyRuleSettings {
            penalty_enabled: true,
            absent_threshold: threshold,
            bonus_enabled: false,
        }
    }

    fn bonus_rules() -> WeeklyRuleSettings {
        WeeklyRuleSettings {
            penalty_enabled: false,
            absent_threshold: 4,
            bonus_enabled: true,
        }
    }

    fn employee() -> Employee {
        Employee::new(Uuid::nil(), Some(EMP.into()), "Asha", "Rao")
    }

    fn absent_days(days: impl IntoIterator<Item = u32>) -> Vec<DailyAttendanceRecord> {
        days.into_iter()
            .map(|d| record(d, AttendanceStatus::Absent))
            .collect()
    }

    fn penalty(records: &[DailyAttendanceRecord], threshold: u32) -> u32 {
        weekly_penalty_days(records, &penalty_rules(threshold), true, date(1), date(30))
    }

    #[test]
    fn test_week_start_is_monday() {
        assert_eq!(week_start(date(8)), date(2));
        assert_eq!(week_start(date(2)), date(2));
        assert_eq!(week_start(date(1)).weekday(), Weekday::Mon);
    }

    #[test]
    fn test_penalty_below_threshold() {
        assert_eq!(penalty(&absent_days(2..=4), 4), 0);
    }

    #[test]
    fn test_penalty_at_threshold() {
        assert_eq!(penalty(&absent_days(2..=5), 4), 1);
    }

    #[test]
    fn test_penalty_capped_per_week() {
        assert_eq!(penalty(&absent_days(2..=7), 4), 1);
    }

    #[test]
    fn test_penalty_counts_each_week() {
        let mut records = absent_days(2..=5);
        records.extend(absent_days(9..=12));
        assert_eq!(penalty(&records, 4), 2);
    }

    #[test]
    fn test_penalty_ignores_flagged_days() {
        let mut records = absent_days(2..=5);
        records[0].penalty_ignored = true;
        assert_eq!(penalty(&records, 4), 0);
    }

    #[test]
    fn test_penalty_only_counts_days_in_range() {
        // Week of 30 June 2025 spills into July.
        let records = vec![
            record(30, AttendanceStatus::Absent),
            DailyAttendanceRecord::new(
                Uuid::nil(),
                EMP,
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                AttendanceStatus::Absent,
            ),
        ];
        assert_eq!(penalty(&records, 2), 0);
    }

    #[test]
    fn test_penalty_disabled_by_tenant() {
        let rules = WeeklyRuleSettings {
            penalty_enabled: false,
            ..penalty_rules(4)
        };
        assert_eq!(
            weekly_penalty_days(&absent_days(2..=7), &rules, true, date(1), date(30)),
            0
        );
    }

    #[test]
    fn test_bonus_threshold_clamped() {
        assert_eq!(bonus_present_threshold(4), 3);
        assert_eq!(bonus_present_threshold(7), 1);
        assert_eq!(bonus_present_threshold(9), 1);
    }

    #[test]
    fn test_bonus_below_threshold() {
        let records = vec![record(2, AttendanceStatus::Present), record(3, AttendanceStatus::HalfDay)];
        assert_eq!(
            evaluate_weekly_bonus(&employee(), &bonus_rules(), date(3), &records),
            BonusDecision::BelowThreshold { present: 1, required: 3 }
        );
    }

    #[test]
    fn test_bonus_paid_leave_counts() {
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(3, AttendanceStatus::PaidLeave),
            record(7, AttendanceStatus::Present),
        ];
        assert_eq!(
            evaluate_weekly_bonus(&employee(), &bonus_rules(), date(7), &records),
            BonusDecision::Grant { date: date(8) }
        );
    }

    #[test]
    fn test_bonus_is_idempotent_once_marked() {
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(3, AttendanceStatus::Present),
            record(4, AttendanceStatus::Present),
            record(8, AttendanceStatus::Present),
        ];
        assert_eq!(
            evaluate_weekly_bonus(&employee(), &bonus_rules(), date(4), &records),
            BonusDecision::AlreadyMarked
        );
    }

    #[test]
    fn test_bonus_picks_first_off_day() {
        let mut employee = employee();
        employee.off_days = WeeklyOffDays {
            wednesday: true,
            sunday: true,
            ..WeeklyOffDays::NONE
        };
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(3, AttendanceStatus::Present),
            record(5, AttendanceStatus::Present),
        ];
        assert_eq!(
            evaluate_weekly_bonus(&employee, &bonus_rules(), date(5), &records),
            BonusDecision::Grant { date: date(4) }
        );
    }

    #[test]
    fn test_bonus_without_off_days() {
        let mut employee = employee();
        employee.off_days = WeeklyOffDays::NONE;
        assert_eq!(
            evaluate_weekly_bonus(&employee, &bonus_rules(), date(2), &[]),
            BonusDecision::NoOffDays
        );
    }

    #[test]
    fn test_bonus_before_joining() {
        let mut employee = employee();
        employee.date_of_joining = Some(date(9));
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(3, AttendanceStatus::Present),
            record(4, AttendanceStatus::Present),
        ];
        assert_eq!(
            evaluate_weekly_bonus(&employee, &bonus_rules(), date(4), &records),
            BonusDecision::BeforeJoining
        );
    }

    #[test]
    fn test_bonus_respects_employee_opt_out() {
        let mut employee = employee();
        employee.weekly_rules_enabled = false;
        assert_eq!(
            evaluate_weekly_bonus(&employee, &bonus_rules(), date(2), &[]),
            BonusDecision::Disabled
        );
    }
}
