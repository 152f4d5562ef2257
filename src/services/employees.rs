//! Employee lifecycle: creation with code generation and OT derivation,
//! deactivation and cascade delete.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::PayrollEngine;
use crate::cache::CacheScope;
use crate::calculation::{employee_code_prefix, next_employee_code};
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, TenantId, WeeklyOffDays};
use crate::store::Tables;

const EMPLOYEE_LIST_SCOPES: [CacheScope; 2] =
    [CacheScope::AttendanceRecords, CacheScope::EligibleEmployees];

fn default_true() -> bool {
    true
}

/// Input for [`PayrollEngine::create_employee`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Explicit code; generated when absent.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// First name.
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
    /// Date of joining.
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Shift start; 09:00 when absent.
    #[serde(default)]
    pub shift_start_time: Option<NaiveTime>,
    /// Shift end; 18:00 when absent.
    #[serde(default)]
    pub shift_end_time: Option<NaiveTime>,
    /// Weekly off days; Sunday when absent.
    #[serde(default)]
    pub off_days: Option<WeeklyOffDays>,
    /// Static OT rate; derived when absent.
    #[serde(default)]
    pub ot_charge_per_hour: Option<Decimal>,
    /// TDS override.
    #[serde(default)]
    pub tds_percentage: Option<Decimal>,
    /// Whether weekly penalty and bonus apply.
    #[serde(default = "default_true")]
    pub weekly_rules_enabled: bool,
}

impl NewEmployee {
    /// A minimal employee with default shift and off days.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, basic_salary: Decimal) -> Self {
        Self {
            employee_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            department: None,
            date_of_joining: None,
            basic_salary,
            shift_start_time: None,
            shift_end_time: None,
            off_days: None,
            ot_charge_per_hour: None,
            tds_percentage: None,
            weekly_rules_enabled: true,
        }
    }

    fn validate(&self) -> EngineResult<()> {
        let invalid = |field: &str, message: &str| EngineError::InvalidEmployee {
            field: field.to_string(),
            message: message.to_string(),
        };
        if self.first_name.trim().is_empty() {
            return Err(invalid("first_name", "is required"));
        }
        if self.basic_salary < Decimal::ZERO {
            return Err(invalid("basic_salary", "must not be negative"));
        }
        if self.ot_charge_per_hour.is_some_and(|rate| rate < Decimal::ZERO) {
            return Err(invalid("ot_charge_per_hour", "must not be negative"));
        }
        if self
            .tds_percentage
            .is_some_and(|rate| rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED)
        {
            return Err(invalid("tds_percentage", "must be between 0 and 100"));
        }
        Ok(())
    }
}

/// Outcome of bulk code generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIdReport {
    /// Codes assigned, in assignment order.
    pub assigned: Vec<String>,
    /// One message per employee that could not get a code.
    pub errors: Vec<String>,
}

fn generate_code(tables: &Tables, tenant_id: TenantId, employee: &Employee) -> EngineResult<String> {
    let prefix = employee_code_prefix(
        &employee.first_name,
        &employee.last_name,
        employee.department.as_deref(),
    )?;
    Ok(next_employee_code(
        &prefix,
        tables.employees_of(tenant_id).filter_map(Employee::code),
    ))
}

impl PayrollEngine {
    /// Creates an employee.
    ///
    /// A missing code is generated; a supplied one must be unused within the
    /// tenant. A missing OT rate is derived from the tenant's break time and
    /// average days per month and then kept.
    pub fn create_employee(&self, tenant_id: TenantId, input: NewEmployee) -> EngineResult<Employee> {
        input.validate()?;
        let employee = self.store().write(|t| {
            let tenant = t.active_tenant(tenant_id)?;
            let (break_time, average_days) = (tenant.break_time, tenant.average_days_per_month);

            let mut employee = Employee::new(
                tenant_id,
                None,
                input.first_name.trim(),
                input.last_name.trim(),
            );
            employee.department = input.department.filter(|d| !d.trim().is_empty());
            employee.date_of_joining = input.date_of_joining;
            employee.basic_salary = input.basic_salary;
            if let Some(start) = input.shift_start_time {
                employee.shift_start_time = start;
            }
            if let Some(end) = input.shift_end_time {
                employee.shift_end_time = end;
            }
            if let Some(off_days) = input.off_days {
                employee.off_days = off_days;
            }
            employee.ot_charge_per_hour = input.ot_charge_per_hour;
            employee.tds_percentage = input.tds_percentage;
            employee.weekly_rules_enabled = input.weekly_rules_enabled;

            let code = match input.employee_id.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                Some(code) => {
                    if t.employee_by_code(tenant_id, code).is_ok() {
                        return Err(EngineError::InvalidEmployee {
                            field: "employee_id".to_string(),
                            message: format!("'{code}' is already in use"),
                        });
                    }
                    code.to_string()
                }
                None => generate_code(t, tenant_id, &employee)?,
            };
            employee.employee_id = Some(code);
            employee.ensure_ot_rate(break_time, average_days);

            t.employees.insert(employee.id, employee.clone());
            Ok(employee)
        })?;

        info!(
            tenant_id = %tenant_id,
            employee_id = employee.code().unwrap_or_default(),
            "employee created"
        );
        self.cache().invalidate(tenant_id, &EMPLOYEE_LIST_SCOPES);
        Ok(employee)
    }

    /// Assigns generated codes to every employee of the tenant lacking one.
    pub fn generate_missing_employee_ids(&self, tenant_id: TenantId) -> EngineResult<BulkIdReport> {
        let report = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let mut pending: Vec<(Uuid, String, String)> = t
                .employees_of(tenant_id)
                .filter(|e| e.code().is_none())
                .map(|e| (e.id, e.first_name.clone(), e.last_name.clone()))
                .collect();
            pending.sort_by(|a, b| (&a.1, &a.2, a.0).cmp(&(&b.1, &b.2, b.0)));

            let mut report = BulkIdReport::default();
            for (id, _, _) in pending {
                let generated = t
                    .employees
                    .get(&id)
                    .ok_or_else(|| EngineError::not_found("employee", id))
                    .and_then(|e| generate_code(t, tenant_id, e));
                match (generated, t.employees.get_mut(&id)) {
                    (Ok(code), Some(employee)) => {
                        employee.employee_id = Some(code.clone());
                        report.assigned.push(code);
                    }
                    (Err(err), _) => report.errors.push(format!("{id}: {err}")),
                    (Ok(_), None) => report.errors.push(format!("{id}: employee vanished")),
                }
            }
            Ok(report)
        })?;

        if !report.errors.is_empty() {
            warn!(
                tenant_id = %tenant_id,
                failed = report.errors.len(),
                "some employees could not be given an id"
            );
        }
        info!(tenant_id = %tenant_id, assigned = report.assigned.len(), "employee ids generated");
        self.cache().invalidate(tenant_id, &EMPLOYEE_LIST_SCOPES);
        Ok(report)
    }

    /// The employee with code `employee_id`.
    pub fn employee(&self, tenant_id: TenantId, employee_id: &str) -> EngineResult<Employee> {
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            t.employee_by_code(tenant_id, employee_id).cloned()
        })?
    }

    /// Every employee of the tenant, ordered by code.
    pub fn employees(&self, tenant_id: TenantId) -> EngineResult<Vec<Employee>> {
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            let mut employees: Vec<Employee> = t.employees_of(tenant_id).cloned().collect();
            employees.sort_by(|a, b| a.code().cmp(&b.code()).then(a.id.cmp(&b.id)));
            Ok(employees)
        })?
    }

    /// Marks an employee inactive from `on`. They remain payable for the
    /// month containing `on`.
    pub fn deactivate_employee(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        on: NaiveDate,
    ) -> EngineResult<Employee> {
        let employee = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let id = t.employee_by_code(tenant_id, employee_id)?.id;
            let employee = t
                .employees
                .get_mut(&id)
                .ok_or_else(|| EngineError::not_found("employee", employee_id))?;
            employee.is_active = false;
            employee.inactive_marked_at = Some(on);
            Ok(employee.clone())
        })?;
        info!(tenant_id = %tenant_id, employee_id, on = %on, "employee deactivated");
        self.cache().invalidate(tenant_id, &EMPLOYEE_LIST_SCOPES);
        Ok(employee)
    }

    /// Deletes an employee and every row they own. Returns the number of
    /// dependent rows removed.
    pub fn delete_employee(&self, tenant_id: TenantId, employee_id: &str) -> EngineResult<usize> {
        let removed = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let id = t.employee_by_code(tenant_id, employee_id)?.id;
            t.employees.remove(&id);
            Ok(t.remove_employee_rows(tenant_id, employee_id))
        })?;
        warn!(tenant_id = %tenant_id, employee_id, removed, "employee deleted");
        self.cache()
            .invalidate(tenant_id, &CacheScope::ATTENDANCE_WRITE);
        Ok(removed)
    }
}
