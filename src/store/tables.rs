//! Row tables held by the [`Store`](super::Store).

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdvanceLedger, CalculatedSalary, ChartAggregatedData, DailyAttendanceRecord, Employee,
    EmployeeMonth, Holiday, MonthlyAttendance, MonthlyAttendanceSummary, PayrollPeriod,
    SalaryData, Tenant, TenantId,
};

/// Key of a daily attendance row.
pub type DailyKey = (TenantId, String, NaiveDate);

/// Key of a payroll period.
pub type PeriodKey = (TenantId, i32, u32);

/// Every table of the engine.
#[derive(Debug, Default)]
pub struct Tables {
    /// Tenants by id.
    pub tenants: HashMap<TenantId, Tenant>,
    /// Employees by row id.
    pub employees: HashMap<Uuid, Employee>,
    /// Daily attendance ordered by tenant, employee and date.
    pub daily: BTreeMap<DailyKey, DailyAttendanceRecord>,
    /// Monthly summaries rolled up from daily attendance.
    pub summaries: HashMap<EmployeeMonth, MonthlyAttendanceSummary>,
    /// Monthly attendance, uploaded or rolled up.
    pub monthly: HashMap<EmployeeMonth, MonthlyAttendance>,
    /// Uploaded salary rows.
    pub salary_data: HashMap<EmployeeMonth, SalaryData>,
    /// Holidays by id.
    pub holidays: HashMap<Uuid, Holiday>,
    /// Payroll periods.
    pub periods: HashMap<PeriodKey, PayrollPeriod>,
    /// Calculated salaries.
    pub salaries: HashMap<EmployeeMonth, CalculatedSalary>,
    /// Advances by id.
    pub advances: HashMap<Uuid, AdvanceLedger>,
    /// Chart rows.
    pub charts: HashMap<EmployeeMonth, ChartAggregatedData>,
}

impl Tables {
    /// A tenant that exists and has not been soft-deleted.
    pub fn active_tenant(&self, tenant_id: TenantId) -> EngineResult<&Tenant> {
        self.tenants
            .get(&tenant_id)
            .filter(|t| !t.is_deleted())
            .ok_or(EngineError::TenantNotFound { tenant_id })
    }

    /// Mutable access to an active tenant.
    pub fn active_tenant_mut(&mut self, tenant_id: TenantId) -> EngineResult<&mut Tenant> {
        self.tenants
            .get_mut(&tenant_id)
            .filter(|t| !t.is_deleted())
            .ok_or(EngineError::TenantNotFound { tenant_id })
    }

    /// Employees of a tenant, in no particular order.
    pub fn employees_of(&self, tenant_id: TenantId) -> impl Iterator<Item = &Employee> {
        self.employees
            .values()
            .filter(move |e| e.tenant_id == tenant_id)
    }

    /// The employee with code `employee_id`.
    pub fn employee_by_code(&self, tenant_id: TenantId, employee_id: &str) -> EngineResult<&Employee> {
        self.employees_of(tenant_id)
            .find(|e| e.code() == Some(employee_id))
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    /// Daily records of one employee within `start..=end`, oldest first.
    pub fn daily_between(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<DailyAttendanceRecord> {
        if start > end {
            return Vec::new();
        }
        let from = (tenant_id, employee_id.to_string(), start);
        let to = (tenant_id, employee_id.to_string(), end);
        self.daily.range(from..=to).map(|(_, r)| r.clone()).collect()
    }

    /// Returns true if any daily record of the tenant falls in the month.
    pub fn has_daily_in_month(&self, tenant_id: TenantId, year: i32, month: u32) -> bool {
        self.daily
            .values()
            .any(|r| r.tenant_id == tenant_id && r.date.year() == year && r.date.month() == month)
    }

    /// Returns true if any salary row was uploaded for the tenant-month.
    pub fn has_salary_data_in_month(&self, tenant_id: TenantId, year: i32, month: u32) -> bool {
        self.salary_data
            .keys()
            .any(|k| k.tenant_id == tenant_id && k.year == year && k.month == month)
    }

    /// Holidays of a tenant, active or not.
    pub fn holidays_of(&self, tenant_id: TenantId) -> Vec<Holiday> {
        self.holidays
            .values()
            .filter(|h| h.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    /// Rows keyed by employee-month belonging to one employee.
    pub fn rows_for<'a, T>(
        rows: &'a HashMap<EmployeeMonth, T>,
        tenant_id: TenantId,
        employee_id: &'a str,
    ) -> impl Iterator<Item = &'a T> + 'a {
        rows.iter()
            .filter(move |(k, _)| k.tenant_id == tenant_id && k.employee_id == employee_id)
            .map(|(_, row)| row)
    }

    /// Advances of one employee.
    pub fn advances_of(&self, tenant_id: TenantId, employee_id: &str) -> Vec<AdvanceLedger> {
        self.advances
            .values()
            .filter(|a| a.tenant_id == tenant_id && a.employee_id == employee_id)
            .cloned()
            .collect()
    }

    /// The calculated salary with row id `salary_id`.
    pub fn salary_by_id_mut(
        &mut self,
        tenant_id: TenantId,
        salary_id: Uuid,
    ) -> EngineResult<&mut CalculatedSalary> {
        self.salaries
            .values_mut()
            .find(|s| s.id == salary_id && s.key.tenant_id == tenant_id)
            .ok_or_else(|| EngineError::not_found("salary", salary_id))
    }

    /// Removes every row owned by one employee. Returns the number removed.
    pub fn remove_employee_rows(&mut self, tenant_id: TenantId, employee_id: &str) -> usize {
        let owned = |k: &EmployeeMonth| k.tenant_id == tenant_id && k.employee_id == employee_id;
        let before = self.row_count();

        self.daily
            .retain(|(t, e, _), _| !(*t == tenant_id && e == employee_id));
        self.summaries.retain(|k, _| !owned(k));
        self.monthly.retain(|k, _| !owned(k));
        self.salary_data.retain(|k, _| !owned(k));
        self.salaries.retain(|k, _| !owned(k));
        self.charts.retain(|k, _| !owned(k));
        self.advances
            .retain(|_, a| !(a.tenant_id == tenant_id && a.employee_id == employee_id));

        before - self.row_count()
    }

    /// Removes a tenant and everything it owns.
    pub fn remove_tenant_rows(&mut self, tenant_id: TenantId) {
        self.tenants.remove(&tenant_id);
        self.employees.retain(|_, e| e.tenant_id != tenant_id);
        self.daily.retain(|(t, _, _), _| *t != tenant_id);
        self.summaries.retain(|k, _| k.tenant_id != tenant_id);
        self.monthly.retain(|k, _| k.tenant_id != tenant_id);
        self.salary_data.retain(|k, _| k.tenant_id != tenant_id);
        self.holidays.retain(|_, h| h.tenant_id != tenant_id);
        self.periods.retain(|(t, _, _), _| *t != tenant_id);
        self.salaries.retain(|k, _| k.tenant_id != tenant_id);
        self.advances.retain(|_, a| a.tenant_id != tenant_id);
        self.charts.retain(|k, _| k.tenant_id != tenant_id);
    }

    fn row_count(&self) -> usize {
        self.daily.len()
            + self.summaries.len()
            + self.monthly.len()
            + self.salary_data.len()
            + self.salaries.len()
            + self.charts.len()
            + self.advances.len()
    }
}
