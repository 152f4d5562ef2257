//! Attendance models.
//!
//! Three raw sources describe an employee-month: day-granular
//! [`DailyAttendanceRecord`]s logged manually, [`MonthlyAttendance`] rows
//! uploaded from spreadsheets, and [`SalaryData`] rows (see `payroll`).
//! [`MonthlyAttendanceSummary`] is a rollup derived from the daily rows only.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenantId;

/// Key of every per-employee, per-month row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeMonth {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Employee code.
    pub employee_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl EmployeeMonth {
    /// Builds a key.
    pub fn new(tenant_id: TenantId, employee_id: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            tenant_id,
            employee_id: employee_id.into(),
            year,
            month,
        }
    }

    /// The key of the month containing `date`.
    pub fn containing(tenant_id: TenantId, employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(tenant_id, employee_id, date.year(), date.month())
    }
}

/// The attendance state of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// Worked the full day.
    Present,
    /// Did not work.
    Absent,
    /// Worked half a day.
    HalfDay,
    /// On paid leave; counts as present.
    PaidLeave,
    /// Nothing recorded yet. Never counts as absence.
    Unmarked,
}

impl AttendanceStatus {
    /// The number of present days this status contributes.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::AttendanceStatus;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(AttendanceStatus::HalfDay.present_weight(), Decimal::new(5, 1));
    /// assert_eq!(AttendanceStatus::Unmarked.present_weight(), Decimal::ZERO);
    /// ```
    pub fn present_weight(self) -> Decimal {
        match self {
            AttendanceStatus::Present | AttendanceStatus::PaidLeave => Decimal::ONE,
            AttendanceStatus::HalfDay => Decimal::new(5, 1),
            AttendanceStatus::Absent | AttendanceStatus::Unmarked => Decimal::ZERO,
        }
    }

    /// Returns true for statuses that count as a full present day in the
    /// weekly bonus check.
    pub fn is_full_presence(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::PaidLeave)
    }
}

/// One manually-logged attendance entry per (tenant, employee, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAttendanceRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Employee code.
    pub employee_id: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Attendance state.
    pub status: AttendanceStatus,
    /// Overtime hours worked that day.
    #[serde(default)]
    pub ot_hours: Decimal,
    /// Minutes late that day.
    #[serde(default)]
    pub late_minutes: u32,
    /// Excludes this day from weekly-penalty counting.
    #[serde(default)]
    pub penalty_ignored: bool,
}

impl DailyAttendanceRecord {
    /// Creates a record with no overtime or lateness.
    pub fn new(
        tenant_id: TenantId,
        employee_id: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            employee_id: employee_id.into(),
            date,
            status,
            ot_hours: Decimal::ZERO,
            late_minutes: 0,
            penalty_ignored: false,
        }
    }

    /// The month key of this record.
    pub fn month_key(&self) -> EmployeeMonth {
        EmployeeMonth::containing(self.tenant_id, self.employee_id.clone(), self.date)
    }
}

/// Monthly rollup of the daily records of one employee.
///
/// Counts are raw: the weekly penalty is stored alongside rather than
/// folded into `present_days`/`absent_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAttendanceSummary {
    /// The employee-month this summary covers.
    pub key: EmployeeMonth,
    /// PRESENT/PAID_LEAVE as 1, HALF_DAY as 0.5.
    pub present_days: Decimal,
    /// Explicit ABSENT days.
    pub absent_days: Decimal,
    /// Explicit UNMARKED days.
    pub unmarked_days: Decimal,
    /// Total overtime hours.
    pub ot_hours: Decimal,
    /// Total late minutes.
    pub late_minutes: u32,
    /// Weeks that crossed the absence threshold.
    pub weekly_penalty_days: Decimal,
}

/// Where a [`MonthlyAttendance`] row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceSource {
    /// Uploaded from a spreadsheet; authoritative for its month.
    ExcelUpload,
    /// Rolled up from daily records by the write pipeline.
    DailyRollup,
}

/// Monthly attendance row used by reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAttendance {
    /// The employee-month this row covers.
    pub key: EmployeeMonth,
    /// Origin of the row.
    pub source: AttendanceSource,
    /// Present days (penalty already applied for rollups).
    pub present_days: Decimal,
    /// Absent days (penalty already applied for rollups).
    pub absent_days: Decimal,
    /// Overtime hours.
    pub ot_hours: Decimal,
    /// Late minutes.
    pub late_minutes: u32,
    /// Working days in the month as stated by the sheet or computed.
    pub total_working_days: Option<Decimal>,
}

impl MonthlyAttendance {
    /// Returns true if this row was uploaded.
    pub fn is_upload(&self) -> bool {
        self.source == AttendanceSource::ExcelUpload
    }
}
