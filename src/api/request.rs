//! Request types for the Payroll Engine API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AttendanceStatus, DailyAttendanceRecord, TenantId};

/// Request body for `POST /tenants/:tenant_id/attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAttendanceRequest {
    /// Employee code.
    pub employee_id: String,
    /// The day being recorded.
    pub date: NaiveDate,
    /// Attendance state.
    pub status: AttendanceStatus,
    /// Overtime hours worked that day.
    #[serde(default)]
    pub ot_hours: Decimal,
    /// Minutes late.
    #[serde(default)]
    pub late_minutes: u32,
    /// Excludes the day from weekly penalty counting.
    #[serde(default)]
    pub penalty_ignored: bool,
}

impl DailyAttendanceRequest {
    /// Builds the record for `tenant_id`.
    pub fn into_record(self, tenant_id: TenantId) -> DailyAttendanceRecord {
        DailyAttendanceRecord {
            ot_hours: self.ot_hours,
            late_minutes: self.late_minutes,
            penalty_ignored: self.penalty_ignored,
            ..DailyAttendanceRecord::new(tenant_id, self.employee_id, self.date, self.status)
        }
    }
}

/// Query parameters of `POST /tenants/:tenant_id/payroll/:year/:month/calculate`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CalculateParams {
    /// Recalculate rows that already exist.
    #[serde(default)]
    pub force_recalculate: bool,
}

/// Request body for `POST /tenants/:tenant_id/salaries/:salary_id/mark-paid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPaidRequest {
    /// Date the salary was paid.
    pub payment_date: NaiveDate,
}

/// Path of the salary endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SalaryPath {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Salary row.
    pub salary_id: Uuid,
}

/// Path of the payroll period endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodPath {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
}

/// Path of a single daily attendance row.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceDayPath {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Employee code.
    pub employee_id: String,
    /// The day.
    pub date: NaiveDate,
}
