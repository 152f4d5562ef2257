//! Attendance reconciliation across daily records, summaries and uploads.
//!
//! Each calendar month touched by a period is resolved independently. For
//! whole months an uploaded row wins, then the monthly summary, then the raw
//! daily records. For custom date ranges the daily records inside the range
//! win and uploads only fill months without any, pro-rated by working days
//! when the range covers part of a month. Absence is never inferred
//! from missing data, and unmarked days are kept apart from absences.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::working_days::{count_working_days, month_bounds};
use super::weekly_rules::weekly_penalty_days;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceStatus, DailyAttendanceRecord, Employee, Holiday, MonthlyAttendance,
    MonthlyAttendanceSummary, SalaryData, WeeklyRuleSettings, attendance_percentage,
};

/// The period attendance is reconciled over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AttendancePeriod {
    /// One or more whole calendar months, as `(year, month)`.
    Months {
        /// The months, in any order.
        months: Vec<(i32, u32)>,
    },
    /// An inclusive date range.
    Range {
        /// First day.
        start: NaiveDate,
        /// Last day.
        end: NaiveDate,
    },
}

impl AttendancePeriod {
    /// A single whole month.
    pub fn month(year: i32, month: u32) -> Self {
        AttendancePeriod::Months {
            months: vec![(year, month)],
        }
    }

    /// Splits the period into per-month segments.
    fn segments(&self) -> EngineResult<Vec<Segment>> {
        match self {
            AttendancePeriod::Months { months } => {
                let mut months = months.clone();
                months.sort_unstable();
                months.dedup();
                months
                    .into_iter()
                    .map(|(year, month)| {
                        let (start, end) = month_bounds(year, month).ok_or_else(|| {
                            EngineError::invalid_input("month", format!("{year}-{month} is not a valid month"))
                        })?;
                        Ok(Segment {
                            year,
                            month,
                            start,
                            end,
                            whole_month: true,
                        })
                    })
                    .collect()
            }
            AttendancePeriod::Range { start, end } => {
                if start > end {
                    return Err(EngineError::invalid_input(
                        "start_date",
                        "start date must not be after end date",
                    ));
                }
                let mut segments = Vec::new();
                let mut cursor = *start;
                while cursor <= *end {
                    let (_, month_end) = month_bounds(cursor.year(), cursor.month())
                        .ok_or_else(|| EngineError::invalid_input("start_date", "date out of range"))?;
                    let seg_end = month_end.min(*end);
                    segments.push(Segment {
                        year: cursor.year(),
                        month: cursor.month(),
                        start: cursor,
                        end: seg_end,
                        whole_month: false,
                    });
                    match seg_end.succ_opt() {
                        Some(next) => cursor = next,
                        None => break,
                    }
                }
                Ok(segments)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    year: i32,
    month: u32,
    start: NaiveDate,
    end: NaiveDate,
    whole_month: bool,
}

impl Segment {
    fn covers_month(&self) -> bool {
        month_bounds(self.year, self.month) == Some((self.start, self.end))
    }
}

/// Which source a month was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonthSource {
    /// An uploaded salary row.
    UploadedSalary,
    /// An uploaded monthly attendance row.
    UploadedAttendance,
    /// The monthly summary rolled up from daily records.
    MonthlySummary,
    /// Daily records aggregated on the fly.
    DailyRecords,
    /// Nothing recorded.
    NoData,
}

/// The employee's raw attendance rows. Rows for other employees or months
/// are tolerated and filtered by key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceSources<'a> {
    /// Day-granular records.
    pub daily: &'a [DailyAttendanceRecord],
    /// Monthly summaries.
    pub summaries: &'a [MonthlyAttendanceSummary],
    /// Monthly attendance rows; only uploads are consulted.
    pub monthly: &'a [MonthlyAttendance],
    /// Uploaded salary rows.
    pub salary_data: &'a [SalaryData],
}

/// One month of reconciled attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthAttendance {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Resolved source.
    pub source: MonthSource,
    /// Paid days, holidays included.
    pub present_days: Decimal,
    /// Absent days, weekly penalties included.
    pub absent_days: Decimal,
    /// Explicitly unmarked days.
    pub unmarked_days: Decimal,
    /// Overtime hours.
    pub ot_hours: Decimal,
    /// Late minutes.
    pub late_minutes: u32,
    /// Applicable holidays on working days.
    pub holiday_days: Decimal,
    /// Weekly penalty days applied.
    pub weekly_penalty_days: Decimal,
    /// Net working days, or the uploaded figure.
    pub total_working_days: Decimal,
}

/// Reconciled attendance of one employee over a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciledAttendance {
    /// Paid days, holidays included.
    pub present_days: Decimal,
    /// Absent days, weekly penalties included.
    pub absent_days: Decimal,
    /// Explicitly unmarked days.
    pub unmarked_days: Decimal,
    /// Overtime hours.
    pub ot_hours: Decimal,
    /// Late minutes.
    pub late_minutes: u32,
    /// Applicable holidays on working days.
    pub holiday_days: Decimal,
    /// Weekly penalty days applied.
    pub weekly_penalty_days: Decimal,
    /// Net working days.
    pub total_working_days: Decimal,
    /// Per-month breakdown, oldest first.
    pub months: Vec<MonthAttendance>,
}

impl ReconciledAttendance {
    /// Returns true if any month was backed by recorded data.
    pub fn has_evidence(&self) -> bool {
        self.months.iter().any(|m| m.source != MonthSource::NoData)
    }

    /// Worked days over net working days, capped at 100 percent.
    pub fn attendance_percentage(&self) -> Decimal {
        attendance_percentage(
            self.present_days - self.holiday_days,
            self.total_working_days,
        )
    }

    fn push(&mut self, month: MonthAttendance) {
        self.present_days += month.present_days;
        self.absent_days += month.absent_days;
        self.unmarked_days += month.unmarked_days;
        self.ot_hours += month.ot_hours;
        self.late_minutes += month.late_minutes;
        self.holiday_days += month.holiday_days;
        self.weekly_penalty_days += month.weekly_penalty_days;
        self.total_working_days += month.total_working_days;
        self.months.push(month);
    }
}

/// Raw totals of day-granular records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyTotals {
    /// PRESENT/PAID_LEAVE as 1, HALF_DAY as 0.5.
    pub present_days: Decimal,
    /// Explicit ABSENT days.
    pub absent_days: Decimal,
    /// Explicit UNMARKED days.
    pub unmarked_days: Decimal,
    /// Overtime hours.
    pub ot_hours: Decimal,
    /// Late minutes.
    pub late_minutes: u32,
}

impl DailyTotals {
    /// Sums a set of daily records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DailyAttendanceRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut totals, record| {
            totals.present_days += record.status.present_weight();
            match record.status {
                AttendanceStatus::Absent => totals.absent_days += Decimal::ONE,
                AttendanceStatus::Unmarked => totals.unmarked_days += Decimal::ONE,
                _ => {}
            }
            totals.ot_hours += record.ot_hours;
            totals.late_minutes += record.late_minutes;
            totals
        })
    }
}

/// Reconciles `employee`'s attendance over `period`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] for an invalid month or a range
/// whose start follows its end.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{reconcile_attendance, AttendancePeriod, AttendanceSources, MonthSource};
/// use payroll_engine::models::{Employee, WeeklyRuleSettings};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let employee = Employee::new(Uuid::new_v4(), Some("ENG-ASH-001".into()), "Asha", "Rao");
/// let result = reconcile_attendance(
///     &employee,
///     &WeeklyRuleSettings::default(),
///     &[],
///     &AttendancePeriod::month(2025, 6),
///     AttendanceSources::default(),
/// )
/// .unwrap();
///
/// assert_eq!(result.absent_days, Decimal::ZERO);
/// assert_eq!(result.months[0].source, MonthSource::NoData);
/// ```
pub fn reconcile_attendance(
    employee: &Employee,
    rules: &WeeklyRuleSettings,
    holidays: &[Holiday],
    period: &AttendancePeriod,
    sources: AttendanceSources<'_>,
) -> EngineResult<ReconciledAttendance> {
    let code = employee.code().unwrap_or_default();
    let mut result = ReconciledAttendance::default();

    for segment in period.segments()? {
        let working = count_working_days(employee, segment.start, segment.end, holidays);
        let holiday_days = Decimal::from(working.holidays);
        let net_days = Decimal::from(working.net);

        let daily: Vec<&DailyAttendanceRecord> = sources
            .daily
            .iter()
            .filter(|r| r.employee_id == code && r.date >= segment.start && r.date <= segment.end)
            .collect();
        let salary_row = sources
            .salary_data
            .iter()
            .find(|s| s.key.employee_id == code && s.key.year == segment.year && s.key.month == segment.month);
        let upload_row = sources.monthly.iter().find(|m| {
            m.is_upload()
                && m.key.employee_id == code
                && m.key.year == segment.year
                && m.key.month == segment.month
        });
        let summary = sources
            .summaries
            .iter()
            .find(|s| s.key.employee_id == code && s.key.year == segment.year && s.key.month == segment.month);

        let base = MonthAttendance {
            year: segment.year,
            month: segment.month,
            source: MonthSource::NoData,
            present_days: holiday_days,
            absent_days: Decimal::ZERO,
            unmarked_days: Decimal::ZERO,
            ot_hours: Decimal::ZERO,
            late_minutes: 0,
            holiday_days,
            weekly_penalty_days: Decimal::ZERO,
            total_working_days: net_days,
        };

        let from_daily = || {
            let totals = DailyTotals::from_records(daily.iter().copied());
            let penalty = Decimal::from(weekly_penalty_days(
                daily.iter().copied(),
                rules,
                employee.weekly_rules_enabled,
                segment.start,
                segment.end,
            ));
            apply_penalty(
                MonthAttendance {
                    source: MonthSource::DailyRecords,
                    unmarked_days: totals.unmarked_days,
                    ot_hours: totals.ot_hours,
                    late_minutes: totals.late_minutes,
                    ..base.clone()
                },
                totals.present_days,
                totals.absent_days,
                penalty,
            )
        };
        let from_uploads = || {
            if let Some(row) = salary_row {
                Some(MonthAttendance {
                    source: MonthSource::UploadedSalary,
                    present_days: row.days_present + holiday_days,
                    absent_days: row.days_absent,
                    ot_hours: row.ot_hours,
                    late_minutes: row.late_minutes,
                    total_working_days: row.total_working_days.unwrap_or(net_days),
                    ..base.clone()
                })
            } else {
                upload_row.map(|row| MonthAttendance {
                    source: MonthSource::UploadedAttendance,
                    present_days: row.present_days + holiday_days,
                    absent_days: row.absent_days,
                    ot_hours: row.ot_hours,
                    late_minutes: row.late_minutes,
                    total_working_days: row.total_working_days.unwrap_or(net_days),
                    ..base.clone()
                })
            }
        };

        let month = if segment.whole_month {
            if let Some(uploaded) = from_uploads() {
                uploaded
            } else if let Some(summary) = summary {
                apply_penalty(
                    MonthAttendance {
                        source: MonthSource::MonthlySummary,
                        unmarked_days: summary.unmarked_days,
                        ot_hours: summary.ot_hours,
                        late_minutes: summary.late_minutes,
                        ..base.clone()
                    },
                    summary.present_days,
                    summary.absent_days,
                    summary.weekly_penalty_days,
                )
            } else if !daily.is_empty() {
                from_daily()
            } else {
                base.clone()
            }
        } else if !daily.is_empty() {
            from_daily()
        } else {
            match from_uploads() {
                Some(uploaded) if segment.covers_month() => uploaded,
                Some(uploaded) => {
                    let (month_start, month_end) = month_bounds(segment.year, segment.month)
                        .ok_or_else(|| EngineError::invalid_input("start_date", "date out of range"))?;
                    let month_net =
                        Decimal::from(count_working_days(employee, month_start, month_end, holidays).net);
                    let share = if month_net > Decimal::ZERO {
                        net_days / month_net
                    } else {
                        Decimal::ZERO
                    };
                    prorate(uploaded, share, net_days)
                }
                None => base.clone(),
            }
        };

        result.push(month);
    }

    Ok(result)
}

/// Scales whole-month uploaded totals to the share of the month's working
/// days a partial segment covers.
fn prorate(month: MonthAttendance, share: Decimal, segment_working_days: Decimal) -> MonthAttendance {
    let scale = |value: Decimal| (value * share).round_dp(2);
    let late_minutes = (Decimal::from(month.late_minutes) * share)
        .round()
        .to_u32()
        .unwrap_or(0);
    MonthAttendance {
        present_days: scale(month.present_days - month.holiday_days) + month.holiday_days,
        absent_days: scale(month.absent_days),
        ot_hours: scale(month.ot_hours),
        late_minutes,
        total_working_days: segment_working_days,
        ..month
    }
}

/// Folds weekly penalty days and holidays into raw present/absent counts.
fn apply_penalty(
    month: MonthAttendance,
    raw_present: Decimal,
    raw_absent: Decimal,
    penalty: Decimal,
) -> MonthAttendance {
    MonthAttendance {
        present_days: (raw_present - penalty).max(Decimal::ZERO) + month.holiday_days,
        absent_days: raw_absent + penalty,
        weekly_penalty_days: penalty,
        ..month
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceSource, EmployeeMonth};
    use std::str::FromStr;
    use uuid::Uuid;

    const EMP: &str = "ENG-ASH-001";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn employee() -> Employee {
        Employee::new(Uuid::nil(), Some(EMP.into()), "Asha", "Rao")
    }

    fn record(m: u32, d: u32, status: AttendanceStatus) -> DailyAttendanceRecord {
        DailyAttendanceRecord::new(Uuid::nil(), EMP, date(m, d), status)
    }

    fn penalty_rules() -> WeeklyRuleSettings {
        WeeklyRuleSettings {
            penalty_enabled: true,
            absent_threshold: 4,
            bonus_enabled: false,
        }
    }

    fn salary_row(present: &str, absent: &str) -> SalaryData {
        SalaryData {
            key: EmployeeMonth::new(Uuid::nil(), EMP, 2025, 6),
            employee_name: "Asha Rao".into(),
            department: None,
            basic_salary: dec("30000"),
            days_present: dec(present),
            days_absent: dec(absent),
            total_working_days: Some(dec("26")),
            ot_hours: dec("4"),
            late_minutes: 30,
            ot_charges: Decimal::ZERO,
            late_deduction: Decimal::ZERO,
            gross_salary: dec("28000"),
            tds_amount: Decimal::ZERO,
            advance_deduction: Decimal::ZERO,
            net_payable: dec("28000"),
            is_paid: false,
            payment_date: None,
        }
    }

    fn reconcile(
        period: AttendancePeriod,
        holidays: &[Holiday],
        sources: AttendanceSources<'_>,
    ) -> ReconciledAttendance {
        reconcile_attendance(&employee(), &penalty_rules(), holidays, &period, sources).unwrap()
    }

    #[test]
    fn test_no_data_means_no_absence() {
        let holiday = Holiday::company_wide(Uuid::nil(), date(6, 10), "Founders Day");
        let result = reconcile(AttendancePeriod::month(2025, 6), &[holiday], AttendanceSources::default());
        assert_eq!(result.absent_days, Decimal::ZERO);
        assert_eq!(result.present_days, result.holiday_days);
        assert_eq!(result.holiday_days, Decimal::ONE);
        assert_eq!(result.total_working_days, dec("24"));
        assert!(!result.has_evidence());
    }

    #[test]
    fn test_upload_beats_daily_for_whole_month() {
        let daily = vec![
            record(6, 2, AttendanceStatus::Absent),
            record(6, 3, AttendanceStatus::Absent),
        ];
        let uploads = vec![salary_row("24", "1")];
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[],
            AttendanceSources {
                daily: &daily,
                salary_data: &uploads,
                ..Default::default()
            },
        );
        assert_eq!(result.present_days, dec("24"));
        assert_eq!(result.absent_days, dec("1"));
        assert_eq!(result.total_working_days, dec("26"));
        assert_eq!(result.months[0].source, MonthSource::UploadedSalary);
    }

    #[test]
    fn test_uploaded_attendance_used_when_no_salary_row() {
        let monthly = vec![MonthlyAttendance {
            key: EmployeeMonth::new(Uuid::nil(), EMP, 2025, 6),
            source: AttendanceSource::ExcelUpload,
            present_days: dec("20"),
            absent_days: dec("5"),
            ot_hours: Decimal::ZERO,
            late_minutes: 0,
            total_working_days: None,
        }];
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[],
            AttendanceSources {
                monthly: &monthly,
                ..Default::default()
            },
        );
        assert_eq!(result.months[0].source, MonthSource::UploadedAttendance);
        assert_eq!(result.present_days, dec("20"));
        assert_eq!(result.total_working_days, dec("25"));
    }

    #[test]
    fn test_daily_rollup_rows_are_not_uploads() {
        let monthly = vec![MonthlyAttendance {
            key: EmployeeMonth::new(Uuid::nil(), EMP, 2025, 6),
            source: AttendanceSource::DailyRollup,
            present_days: dec("20"),
            absent_days: dec("5"),
            ot_hours: Decimal::ZERO,
            late_minutes: 0,
            total_working_days: None,
        }];
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[],
            AttendanceSources {
                monthly: &monthly,
                ..Default::default()
            },
        );
        assert_eq!(result.months[0].source, MonthSource::NoData);
    }

    #[test]
    fn test_summary_applies_penalty() {
        let summaries = vec![MonthlyAttendanceSummary {
            key: EmployeeMonth::new(Uuid::nil(), EMP, 2025, 6),
            present_days: dec("20"),
            absent_days: dec("4"),
            unmarked_days: dec("1"),
            ot_hours: dec("2"),
            late_minutes: 15,
            weekly_penalty_days: Decimal::ONE,
        }];
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[],
            AttendanceSources {
                summaries: &summaries,
                ..Default::default()
            },
        );
        assert_eq!(result.present_days, dec("19"));
        assert_eq!(result.absent_days, dec("5"));
        assert_eq!(result.unmarked_days, dec("1"));
        assert_eq!(result.months[0].source, MonthSource::MonthlySummary);
    }

    #[test]
    fn test_daily_aggregation_with_penalty() {
        let mut daily: Vec<_> = (2..=5).map(|d| record(6, d, AttendanceStatus::Absent)).collect();
        daily.push(record(6, 6, AttendanceStatus::Present));
        daily.push(record(6, 7, AttendanceStatus::HalfDay));
        daily.push(record(6, 9, AttendanceStatus::Unmarked));
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[],
            AttendanceSources {
                daily: &daily,
                ..Default::default()
            },
        );
        // 1.5 raw present less one penalty day.
        assert_eq!(result.present_days, dec("0.5"));
        assert_eq!(result.absent_days, dec("5"));
        assert_eq!(result.unmarked_days, dec("1"));
        assert_eq!(result.weekly_penalty_days, Decimal::ONE);
        assert_eq!(result.months[0].source, MonthSource::DailyRecords);
    }

    #[test]
    fn test_penalty_floors_present_at_zero() {
        let daily: Vec<_> = (2..=5).map(|d| record(6, d, AttendanceStatus::Absent)).collect();
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[],
            AttendanceSources {
                daily: &daily,
                ..Default::default()
            },
        );
        assert_eq!(result.present_days, Decimal::ZERO);
        assert_eq!(result.absent_days, dec("5"));
    }

    #[test]
    fn test_custom_range_prefers_daily_records() {
        let daily = vec![record(6, 2, AttendanceStatus::Present)];
        let uploads = vec![salary_row("24", "1")];
        let result = reconcile(
            AttendancePeriod::Range {
                start: date(6, 1),
                end: date(6, 15),
            },
            &[],
            AttendanceSources {
                daily: &daily,
                salary_data: &uploads,
                ..Default::default()
            },
        );
        assert_eq!(result.present_days, Decimal::ONE);
        assert_eq!(result.months[0].source, MonthSource::DailyRecords);
    }

    #[test]
    fn test_custom_range_uploads_fill_uncovered_months() {
        let daily = vec![record(5, 20, AttendanceStatus::Present)];
        let uploads = vec![salary_row("24", "1")];
        let result = reconcile(
            AttendancePeriod::Range {
                start: date(5, 15),
                end: date(6, 30),
            },
            &[],
            AttendanceSources {
                daily: &daily,
                salary_data: &uploads,
                ..Default::default()
            },
        );
        assert_eq!(result.months.len(), 2);
        assert_eq!(result.months[0].source, MonthSource::DailyRecords);
        assert_eq!(result.months[1].source, MonthSource::UploadedSalary);
        assert_eq!(result.present_days, dec("25"));
    }

    #[test]
    fn test_partial_range_prorates_uploaded_month() {
        let uploads = vec![salary_row("24", "1")];
        let result = reconcile(
            AttendancePeriod::Range {
                start: date(6, 1),
                end: date(6, 10),
            },
            &[],
            AttendanceSources {
                salary_data: &uploads,
                ..Default::default()
            },
        );
        // 8 of June's 25 working days fall in the range.
        assert_eq!(result.months[0].source, MonthSource::UploadedSalary);
        assert_eq!(result.total_working_days, dec("8"));
        assert_eq!(result.present_days, dec("7.68"));
        assert_eq!(result.absent_days, dec("0.32"));
        assert_eq!(result.ot_hours, dec("1.28"));
        assert_eq!(result.late_minutes, 10);
        assert!(result.present_days <= result.total_working_days);
    }

    #[test]
    fn test_other_employees_records_ignored() {
        let daily = vec![DailyAttendanceRecord::new(
            Uuid::nil(),
            "OPS-RAV-001",
            date(6, 2),
            AttendanceStatus::Absent,
        )];
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[],
            AttendanceSources {
                daily: &daily,
                ..Default::default()
            },
        );
        assert_eq!(result.months[0].source, MonthSource::NoData);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = reconcile_attendance(
            &employee(),
            &penalty_rules(),
            &[],
            &AttendancePeriod::Range {
                start: date(6, 10),
                end: date(6, 1),
            },
            AttendanceSources::default(),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_attendance_percentage_excludes_holidays() {
        let holiday = Holiday::company_wide(Uuid::nil(), date(6, 10), "Founders Day");
        let daily: Vec<_> = (2..=7).map(|d| record(6, d, AttendanceStatus::Present)).collect();
        let result = reconcile(
            AttendancePeriod::month(2025, 6),
            &[holiday],
            AttendanceSources {
                daily: &daily,
                ..Default::default()
            },
        );
        // 6 worked days over 24 net working days.
        assert_eq!(result.attendance_percentage(), dec("25"));
    }
}
