//! Denormalized chart rows read by the reporting endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CalculatedSalary, EmployeeMonth, SalaryData};

/// Origin of a chart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartSource {
    /// Copied from an uploaded salary row.
    Uploaded,
    /// Copied from a calculated salary. Wins over uploaded rows.
    Calculated,
}

/// One employee-month of chart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAggregatedData {
    /// The employee-month.
    pub key: EmployeeMonth,
    /// Employee name.
    pub employee_name: String,
    /// Department.
    pub department: Option<String>,
    /// Gross salary.
    pub gross_salary: Decimal,
    /// Net payable.
    pub net_salary: Decimal,
    /// Overtime hours.
    pub ot_hours: Decimal,
    /// Late minutes.
    pub late_minutes: u32,
    /// Present days.
    pub present_days: Decimal,
    /// Working days.
    pub working_days: Decimal,
    /// Present days over working days, as a percentage capped at 100.
    pub attendance_percentage: Decimal,
    /// Origin of the row.
    pub source: ChartSource,
}

/// Present over working days as a percentage, capped at 100, 2 dp.
pub(crate) fn attendance_percentage(present: Decimal, working: Decimal) -> Decimal {
    if working <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (present / working * Decimal::ONE_HUNDRED)
        .min(Decimal::ONE_HUNDRED)
        .max(Decimal::ZERO)
        .round_dp(2)
}

impl From<&CalculatedSalary> for ChartAggregatedData {
    fn from(salary: &CalculatedSalary) -> Self {
        let worked_days = salary.present_days - salary.holiday_days;
        Self {
            key: salary.key.clone(),
            employee_name: salary.employee_name.clone(),
            department: salary.department.clone(),
            gross_salary: salary.gross_salary,
            net_salary: salary.net_payable,
            ot_hours: salary.ot_hours,
            late_minutes: salary.late_minutes,
            present_days: salary.present_days,
            working_days: salary.total_working_days,
            attendance_percentage: attendance_percentage(worked_days, salary.total_working_days),
            source: ChartSource::Calculated,
        }
    }
}

impl From<&SalaryData> for ChartAggregatedData {
    fn from(row: &SalaryData) -> Self {
        let working_days = row
            .total_working_days
            .unwrap_or(row.days_present + row.days_absent);
        Self {
            key: row.key.clone(),
            employee_name: row.employee_name.clone(),
            department: row.department.clone(),
            gross_salary: row.gross_salary,
            net_salary: row.net_payable,
            ot_hours: row.ot_hours,
            late_minutes: row.late_minutes,
            present_days: row.days_present,
            working_days,
            attendance_percentage: attendance_percentage(row.days_present, working_days),
            source: ChartSource::Uploaded,
        }
    }
}
