//! Salary formulas.
//!
//! Turns reconciled attendance and compensation settings into gross pay,
//! TDS, advance deduction and net payable. Every formula records an
//! [`AuditStep`] so a payslip can be explained line by line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::display_amount;
use crate::models::{AuditStep, Employee};

/// Inputs of a single salary calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryInputs {
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Paid hours per shift.
    pub shift_hours_per_day: Decimal,
    /// Net working days (holidays excluded).
    pub total_working_days: Decimal,
    /// Reconciled present days, holidays included.
    pub present_days: Decimal,
    /// Holidays paid as present.
    pub holiday_days: Decimal,
    /// Overtime hours.
    pub ot_hours: Decimal,
    /// Overtime rate per hour.
    pub ot_rate_per_hour: Decimal,
    /// Late minutes.
    pub late_minutes: u32,
    /// TDS percentage.
    pub tds_percentage: Decimal,
    /// Outstanding advance balance.
    pub advance_balance: Decimal,
}

/// The result of a salary calculation. Money is rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    /// Working days plus holidays.
    pub payable_base_days: Decimal,
    /// Basic salary per paid hour.
    pub basic_salary_per_hour: Decimal,
    /// Salary earned for present days.
    pub salary_for_present_days: Decimal,
    /// Overtime charges.
    pub ot_charges: Decimal,
    /// Late deduction.
    pub late_deduction: Decimal,
    /// Gross salary, never negative.
    pub gross_salary: Decimal,
    /// TDS amount.
    pub tds_amount: Decimal,
    /// Gross less TDS.
    pub salary_after_tds: Decimal,
    /// Default advance deduction.
    pub advance_deduction: Decimal,
    /// Net payable.
    pub net_payable: Decimal,
    /// One step per formula applied.
    pub audit_trail: Vec<AuditStep>,
}

/// The TDS percentage for `employee`: their override, else the period rate.
pub fn tds_rate_for(employee: &Employee, period_rate: Decimal) -> Decimal {
    employee.tds_percentage.unwrap_or(period_rate)
}

/// Computes a salary.
///
/// # Formulas
///
/// - `payable_base_days = total_working_days + holiday_days`
/// - `basic_salary_per_hour = basic / (payable_base_days × shift_hours)`, or
///   zero when either factor is zero
/// - `salary_for_present_days = basic / payable_base_days × min(present, payable_base_days)`
/// - `ot_charges = ot_hours × ot_rate`
/// - `late_deduction = late_minutes / 60 × basic_salary_per_hour`
/// - `gross = max(salary_for_present_days + ot_charges − late_deduction, 0)`
/// - `tds = gross × rate / 100`
/// - `advance_deduction = min(advance_balance, gross − tds)`
/// - `net = gross − tds − advance_deduction`
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_salary, SalaryInputs};
/// use rust_decimal::Decimal;
///
/// let breakdown = calculate_salary(&SalaryInputs {
///     basic_salary: Decimal::from(26000),
///     shift_hours_per_day: Decimal::from(8),
///     total_working_days: Decimal::from(25),
///     present_days: Decimal::from(26),
///     holiday_days: Decimal::ONE,
///     ot_hours: Decimal::ZERO,
///     ot_rate_per_hour: Decimal::ZERO,
///     late_minutes: 0,
///     tds_percentage: Decimal::from(10),
///     advance_balance: Decimal::from(1000),
/// });
///
/// assert_eq!(breakdown.gross_salary, Decimal::from(26000));
/// assert_eq!(breakdown.tds_amount, Decimal::from(2600));
/// assert_eq!(breakdown.net_payable, Decimal::from(22400));
/// ```
pub fn calculate_salary(inputs: &SalaryInputs) -> SalaryBreakdown {
    let mut trail = AuditTrail::default();

    let payable_base_days = inputs.total_working_days + inputs.holiday_days;
    trail.push(
        "payable_base_days",
        "Payable Base Days",
        serde_json::json!({
            "total_working_days": display_amount(inputs.total_working_days),
            "holiday_days": display_amount(inputs.holiday_days),
        }),
        serde_json::json!({ "payable_base_days": display_amount(payable_base_days) }),
        format!(
            "{} working days + {} holidays = {}",
            display_amount(inputs.total_working_days),
            display_amount(inputs.holiday_days),
            display_amount(payable_base_days)
        ),
    );

    let hour_denominator = payable_base_days * inputs.shift_hours_per_day;
    let per_hour = if hour_denominator > Decimal::ZERO {
        inputs.basic_salary / hour_denominator
    } else {
        Decimal::ZERO
    };
    trail.push(
        "basic_salary_per_hour",
        "Basic Salary Per Hour",
        serde_json::json!({
            "basic_salary": display_amount(inputs.basic_salary),
            "payable_base_days": display_amount(payable_base_days),
            "shift_hours_per_day": display_amount(inputs.shift_hours_per_day),
        }),
        serde_json::json!({ "basic_salary_per_hour": display_amount(per_hour.round_dp(2)) }),
        if hour_denominator > Decimal::ZERO {
            format!(
                "{} / ({} days x {} hours)",
                display_amount(inputs.basic_salary),
                display_amount(payable_base_days),
                display_amount(inputs.shift_hours_per_day)
            )
        } else {
            "No payable hours; hourly rate is zero".to_string()
        },
    );

    let paid_days = inputs.present_days.min(payable_base_days).max(Decimal::ZERO);
    let salary_for_present_days = if payable_base_days > Decimal::ZERO {
        (inputs.basic_salary / payable_base_days * paid_days).round_dp(2)
    } else {
        Decimal::ZERO
    };
    trail.push(
        "salary_for_present_days",
        "Salary For Present Days",
        serde_json::json!({
            "present_days": display_amount(inputs.present_days),
            "paid_days": display_amount(paid_days),
        }),
        serde_json::json!({ "salary_for_present_days": display_amount(salary_for_present_days) }),
        format!(
            "{} paid of {} payable days",
            display_amount(paid_days),
            display_amount(payable_base_days)
        ),
    );

    let ot_charges = (inputs.ot_hours * inputs.ot_rate_per_hour).round_dp(2);
    trail.push(
        "ot_charges",
        "Overtime Charges",
        serde_json::json!({
            "ot_hours": display_amount(inputs.ot_hours),
            "ot_rate_per_hour": display_amount(inputs.ot_rate_per_hour),
        }),
        serde_json::json!({ "ot_charges": display_amount(ot_charges) }),
        format!(
            "{} hours x {}",
            display_amount(inputs.ot_hours),
            display_amount(inputs.ot_rate_per_hour)
        ),
    );

    let late_deduction =
        (Decimal::from(inputs.late_minutes) / Decimal::from(60) * per_hour).round_dp(2);
    trail.push(
        "late_deduction",
        "Late Deduction",
        serde_json::json!({ "late_minutes": inputs.late_minutes }),
        serde_json::json!({ "late_deduction": display_amount(late_deduction) }),
        format!("{} minutes at the hourly basic rate", inputs.late_minutes),
    );

    let gross_salary = (salary_for_present_days + ot_charges - late_deduction).max(Decimal::ZERO);
    trail.push(
        "gross_salary",
        "Gross Salary",
        serde_json::json!({
            "salary_for_present_days": display_amount(salary_for_present_days),
            "ot_charges": display_amount(ot_charges),
            "late_deduction": display_amount(late_deduction),
        }),
        serde_json::json!({ "gross_salary": display_amount(gross_salary) }),
        "Present-day salary plus overtime less late deduction, floored at zero".to_string(),
    );

    let tds_amount = (gross_salary * inputs.tds_percentage / Decimal::ONE_HUNDRED).round_dp(2);
    let salary_after_tds = gross_salary - tds_amount;
    trail.push(
        "tds",
        "Tax Deducted At Source",
        serde_json::json!({
            "gross_salary": display_amount(gross_salary),
            "tds_percentage": display_amount(inputs.tds_percentage),
        }),
        serde_json::json!({
            "tds_amount": display_amount(tds_amount),
            "salary_after_tds": display_amount(salary_after_tds),
        }),
        format!("{}% of gross", display_amount(inputs.tds_percentage)),
    );

    let advance_deduction = inputs
        .advance_balance
        .min(salary_after_tds)
        .max(Decimal::ZERO)
        .round_dp(2);
    let net_payable = salary_after_tds - advance_deduction;
    trail.push(
        "net_payable",
        "Net Payable",
        serde_json::json!({
            "salary_after_tds": display_amount(salary_after_tds),
            "advance_balance": display_amount(inputs.advance_balance),
        }),
        serde_json::json!({
            "advance_deduction": display_amount(advance_deduction),
            "net_payable": display_amount(net_payable),
        }),
        format!(
            "{} after TDS less {} advance deduction",
            display_amount(salary_after_tds),
            display_amount(advance_deduction)
        ),
    );

    SalaryBreakdown {
        payable_base_days,
        basic_salary_per_hour: per_hour.round_dp(2),
        salary_for_present_days,
        ot_charges,
        late_deduction,
        gross_salary,
        tds_amount,
        salary_after_tds,
        advance_deduction,
        net_payable,
        audit_trail: trail.steps,
    }
}

#[derive(Default)]
struct AuditTrail {
    steps: Vec<AuditStep>,
}

impl AuditTrail {
    fn push(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }
}
