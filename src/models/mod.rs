//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod advance;
mod attendance;
mod audit;
mod chart;
mod employee;
mod holiday;
mod payroll;
mod tenant;

pub use advance::{AdvanceLedger, AdvanceStatus};
pub use audit::AuditStep;
pub use attendance::{
    AttendanceSource, AttendanceStatus, DailyAttendanceRecord, EmployeeMonth, MonthlyAttendance,
    MonthlyAttendanceSummary,
};
pub(crate) use chart::attendance_percentage;
pub use chart::{ChartAggregatedData, ChartSource};
pub use employee::{Employee, WeeklyOffDays};
pub use holiday::Holiday;
pub use payroll::{CalculatedSalary, DataSource, PayrollPeriod, SalaryData, SalaryState};
pub use tenant::{Tenant, TenantId, WeeklyRuleSettings};
