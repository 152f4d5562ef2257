//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure calculation functions: working-day counting,
//! the weekly absence penalty and attendance bonus, reconciliation of
//! attendance across daily records, summaries and uploads, the salary
//! formulas, oldest-first advance repayment, and employee code generation.
//!
//! Nothing here touches the store; the services gather the rows and call in.

mod advance_repayment;
mod employee_code;
mod reconciliation;
mod salary;
mod weekly_rules;
mod working_days;

pub use advance_repayment::{RepaymentOutcome, apply_repayment, outstanding_balance};
pub use employee_code::{employee_code_prefix, next_employee_code};
pub use reconciliation::{
    AttendancePeriod, AttendanceSources, DailyTotals, MonthAttendance, MonthSource,
    ReconciledAttendance, reconcile_attendance,
};
pub use salary::{SalaryBreakdown, SalaryInputs, calculate_salary, tds_rate_for};
pub use weekly_rules::{
    BonusDecision, bonus_present_threshold, evaluate_weekly_bonus, week_start,
    weekly_penalty_days,
};
pub use working_days::{WorkingDays, count_working_days, month_bounds, working_days_in_month};
