//! Payroll models: periods, uploaded salary rows and calculated salaries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EmployeeMonth, TenantId};

/// Where the attendance and salary figures of a period come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    /// Uploaded salary sheets only.
    Uploaded,
    /// Manually-logged daily attendance only.
    Frontend,
    /// Both uploads and daily attendance.
    Hybrid,
}

impl DataSource {
    /// Resolves the source of a tenant-month from the evidence present.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::DataSource;
    ///
    /// assert_eq!(DataSource::resolve(true, true), DataSource::Hybrid);
    /// assert_eq!(DataSource::resolve(true, false), DataSource::Uploaded);
    /// assert_eq!(DataSource::resolve(false, true), DataSource::Frontend);
    /// assert_eq!(DataSource::resolve(false, false), DataSource::Frontend);
    /// ```
    pub fn resolve(has_uploaded_salaries: bool, has_daily_attendance: bool) -> Self {
        match (has_uploaded_salaries, has_daily_attendance) {
            (true, true) => DataSource::Hybrid,
            (true, false) => DataSource::Uploaded,
            (false, _) => DataSource::Frontend,
        }
    }
}

/// A monthly payroll period of a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Row identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Resolved data source of the last calculation.
    pub data_source: DataSource,
    /// Calendar days in the month less Sundays.
    pub working_days_in_month: u32,
    /// Default TDS percentage for the period.
    pub tds_rate: Decimal,
    /// Locked periods cannot be recalculated.
    pub is_locked: bool,
}

/// A salary row uploaded from a spreadsheet. Trusted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryData {
    /// The employee-month this row covers.
    pub key: EmployeeMonth,
    /// Employee name as stated on the sheet.
    #[serde(default)]
    pub employee_name: String,
    /// Department as stated on the sheet.
    #[serde(default)]
    pub department: Option<String>,
    /// Basic salary.
    pub basic_salary: Decimal,
    /// Days present.
    pub days_present: Decimal,
    /// Days absent.
    pub days_absent: Decimal,
    /// Working days in the month, when the sheet states it.
    #[serde(default)]
    pub total_working_days: Option<Decimal>,
    /// Overtime hours.
    #[serde(default)]
    pub ot_hours: Decimal,
    /// Late minutes.
    #[serde(default)]
    pub late_minutes: u32,
    /// Overtime charges.
    #[serde(default)]
    pub ot_charges: Decimal,
    /// Late deduction.
    #[serde(default)]
    pub late_deduction: Decimal,
    /// Gross salary.
    pub gross_salary: Decimal,
    /// TDS amount.
    #[serde(default)]
    pub tds_amount: Decimal,
    /// Advance deducted.
    #[serde(default)]
    pub advance_deduction: Decimal,
    /// Net payable.
    pub net_payable: Decimal,
    /// Marked paid on the sheet.
    #[serde(default)]
    pub is_paid: bool,
    /// Payment date stated on the sheet.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
}

/// Lifecycle of a salary for one employee-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalaryState {
    /// No calculated row exists.
    Absent,
    /// Calculated, not yet paid.
    Calculated,
    /// Paid. Only a forced recalculation may change it.
    Paid,
}

impl SalaryState {
    /// The state of an optional salary row.
    pub fn of(salary: Option<&CalculatedSalary>) -> Self {
        match salary {
            None => SalaryState::Absent,
            Some(s) if s.is_paid => SalaryState::Paid,
            Some(_) => SalaryState::Calculated,
        }
    }
}

/// The payroll output for one employee in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedSalary {
    /// Row identifier.
    pub id: Uuid,
    /// The employee-month of this salary.
    pub key: EmployeeMonth,
    /// The payroll period row.
    pub payroll_period_id: Uuid,
    /// Employee name at calculation time.
    pub employee_name: String,
    /// Department at calculation time.
    pub department: Option<String>,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Basic salary per paid hour.
    pub basic_salary_per_hour: Decimal,
    /// Paid hours per shift.
    pub shift_hours_per_day: Decimal,
    /// Net working days of the period for this employee.
    pub total_working_days: Decimal,
    /// Paid days including holidays.
    pub present_days: Decimal,
    /// Absent days including weekly penalties.
    pub absent_days: Decimal,
    /// Holidays paid as present.
    pub holiday_days: Decimal,
    /// Weekly penalty days applied.
    pub weekly_penalty_days: Decimal,
    /// Overtime hours.
    pub ot_hours: Decimal,
    /// Overtime rate per hour.
    pub ot_rate_per_hour: Decimal,
    /// Overtime charges.
    pub ot_charges: Decimal,
    /// Late minutes.
    pub late_minutes: u32,
    /// Late deduction.
    pub late_deduction: Decimal,
    /// Salary earned for paid days.
    pub salary_for_present_days: Decimal,
    /// Gross salary.
    pub gross_salary: Decimal,
    /// TDS percentage applied.
    pub tds_percentage: Decimal,
    /// TDS amount.
    pub tds_amount: Decimal,
    /// Gross less TDS.
    pub salary_after_tds: Decimal,
    /// Outstanding advance balance at calculation time.
    pub advance_balance: Decimal,
    /// Advance amount to deduct from this salary.
    pub advance_deduction_amount: Decimal,
    /// Whether an admin may still edit the advance deduction.
    pub advance_deduction_editable: bool,
    /// Net payable.
    pub net_payable: Decimal,
    /// Whether the salary has been paid.
    pub is_paid: bool,
    /// Payment date.
    pub payment_date: Option<NaiveDate>,
    /// Source of the figures.
    pub data_source: DataSource,
    /// When the figures were calculated.
    pub calculated_at: DateTime<Utc>,
}

impl CalculatedSalary {
    /// The lifecycle state of this row.
    pub fn state(&self) -> SalaryState {
        SalaryState::of(Some(self))
    }

    /// Recomputes `net_payable` from after-TDS salary and advance deduction.
    pub fn recompute_net_payable(&mut self) {
        self.net_payable = (self.salary_after_tds - self.advance_deduction_amount).round_dp(2);
    }
}
