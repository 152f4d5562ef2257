//! Reporting reads: per-employee attendance over a period and chart
//! rollups. Both are served through the tenant cache.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::PayrollEngine;
use super::pipeline::upsert_chart_row;
use crate::cache::CacheScope;
use crate::calculation::{
    AttendancePeriod, AttendanceSources, MonthAttendance, month_bounds, reconcile_attendance,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{ChartAggregatedData, Employee, EmployeeMonth, TenantId};
use crate::store::Tables;

const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimePeriod {
    /// The month containing the reference date.
    #[default]
    #[serde(rename = "this_month")]
    ThisMonth,
    /// The month before it.
    #[serde(rename = "last_month")]
    LastMonth,
    /// The three months ending with the current one.
    #[serde(rename = "last_3_months")]
    Last3Months,
    /// The six months ending with the current one.
    #[serde(rename = "last_6_months")]
    Last6Months,
    /// The twelve months ending with the current one.
    #[serde(rename = "last_12_months")]
    Last12Months,
    /// An explicit date range.
    #[serde(rename = "custom")]
    Custom,
}

impl TimePeriod {
    /// The query-string name.
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::ThisMonth => "this_month",
            TimePeriod::LastMonth => "last_month",
            TimePeriod::Last3Months => "last_3_months",
            TimePeriod::Last6Months => "last_6_months",
            TimePeriod::Last12Months => "last_12_months",
            TimePeriod::Custom => "custom",
        }
    }
}

/// Filters of the attendance report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceQuery {
    /// Reporting window.
    #[serde(default)]
    pub time_period: TimePeriod,
    /// Only employees of this department (case-insensitive).
    #[serde(default)]
    pub department: Option<String>,
    /// First day of a custom window.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of a custom window.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Reference date for relative windows; today when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Chart queries take the same filters as attendance queries.
pub type ChartQuery = AttendanceQuery;

/// A resolved reporting window.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Window {
    period: AttendancePeriod,
    start: NaiveDate,
    end: NaiveDate,
    months: Vec<(i32, u32)>,
}

fn shift_month(year: i32, month: u32, back: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn invalid_month(year: i32, month: u32) -> EngineError {
    EngineError::invalid_input("time_period", format!("{year}-{month} is out of range"))
}

impl AttendanceQuery {
    fn department_filter(&self) -> Option<String> {
        self.department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_lowercase)
    }

    fn window(&self) -> EngineResult<Window> {
        if self.time_period == TimePeriod::Custom {
            let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
                return Err(EngineError::invalid_input(
                    "start_date",
                    "custom periods need start_date and end_date",
                ));
            };
            if start > end {
                return Err(EngineError::invalid_input(
                    "start_date",
                    "start date must not be after end date",
                ));
            }
            let mut months = Vec::new();
            let mut cursor = (start.year(), start.month());
            while cursor <= (end.year(), end.month()) {
                months.push(cursor);
                cursor = if cursor.1 == 12 {
                    (cursor.0 + 1, 1)
                } else {
                    (cursor.0, cursor.1 + 1)
                };
            }
            return Ok(Window {
                period: AttendancePeriod::Range { start, end },
                start,
                end,
                months,
            });
        }

        let as_of = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let (year, month) = (as_of.year(), as_of.month());
        let (latest_back, count) = match self.time_period {
            TimePeriod::ThisMonth => (0, 1),
            TimePeriod::LastMonth => (1, 1),
            TimePeriod::Last3Months => (0, 3),
            TimePeriod::Last6Months => (0, 6),
            TimePeriod::Last12Months => (0, 12),
            TimePeriod::Custom => (0, 1),
        };
        let months: Vec<(i32, u32)> = (latest_back..latest_back + count)
            .rev()
            .map(|back| shift_month(year, month, back))
            .collect();
        let (first_year, first_month) = months[0];
        let (last_year, last_month) = months[months.len() - 1];
        let (start, _) =
            month_bounds(first_year, first_month).ok_or_else(|| invalid_month(first_year, first_month))?;
        let (_, end) =
            month_bounds(last_year, last_month).ok_or_else(|| invalid_month(last_year, last_month))?;
        Ok(Window {
            period: AttendancePeriod::Months {
                months: months.clone(),
            },
            start,
            end,
            months,
        })
    }
}

fn cache_params(query: &AttendanceQuery, window: &Window) -> String {
    format!(
        "{}:{}:{}:{}",
        query.time_period.as_str(),
        window.start,
        window.end,
        query.department_filter().unwrap_or_else(|| "*".to_string())
    )
}

fn department_matches(filter: Option<&str>, department: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(filter) => department.is_some_and(|d| d.trim().to_lowercase() == filter),
    }
}

/// One employee's reconciled attendance over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecordRow {
    /// Employee code.
    pub employee_id: String,
    /// Full name.
    pub name: String,
    /// Department.
    pub department: Option<String>,
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
    /// Holidays on working days.
    pub holiday_days: Decimal,
    /// Weekly penalty days.
    pub weekly_penalty_days: Decimal,
    /// Net working days.
    pub total_working_days: Decimal,
    /// Worked days over working days, in percent.
    pub attendance_percentage: Decimal,
    /// Per-month breakdown with the source each month came from.
    pub months: Vec<MonthAttendance>,
}

/// The attendance report of a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceReport {
    /// Reporting window.
    pub time_period: TimePeriod,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// One row per employee, ordered by code.
    pub rows: Vec<AttendanceRecordRow>,
}

/// Chart totals of one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyChartPoint {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Employees with a chart row.
    pub employees: usize,
    /// Sum of gross salaries.
    pub total_gross: Decimal,
    /// Sum of net salaries.
    pub total_net: Decimal,
    /// Sum of overtime hours.
    pub total_ot_hours: Decimal,
    /// Sum of late minutes.
    pub total_late_minutes: u64,
    /// Mean attendance percentage.
    pub average_attendance_percentage: Decimal,
}

/// Chart totals of one department over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentChartPoint {
    /// Department name.
    pub department: String,
    /// Distinct employees.
    pub employees: usize,
    /// Sum of gross salaries.
    pub total_gross: Decimal,
    /// Sum of net salaries.
    pub total_net: Decimal,
    /// Mean attendance percentage.
    pub average_attendance_percentage: Decimal,
}

/// Chart rollups of a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartReport {
    /// Reporting window.
    pub time_period: TimePeriod,
    /// Every month of the window, oldest first, including empty ones.
    pub months: Vec<MonthlyChartPoint>,
    /// Departments, ordered by name.
    pub departments: Vec<DepartmentChartPoint>,
}

fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp(2)
}

fn attendance_row(
    tables: &Tables,
    tenant_id: TenantId,
    employee: &Employee,
    employee_id: &str,
    window: &Window,
) -> EngineResult<AttendanceRecordRow> {
    let rules = tables.active_tenant(tenant_id)?.weekly_rules();
    let holidays = tables.holidays_of(tenant_id);
    let daily = tables.daily_between(tenant_id, employee_id, window.start, window.end);
    let summaries: Vec<_> = Tables::rows_for(&tables.summaries, tenant_id, employee_id)
        .cloned()
        .collect();
    let monthly: Vec<_> = Tables::rows_for(&tables.monthly, tenant_id, employee_id)
        .cloned()
        .collect();
    let salary_data: Vec<_> = Tables::rows_for(&tables.salary_data, tenant_id, employee_id)
        .cloned()
        .collect();

    let attendance = reconcile_attendance(
        employee,
        &rules,
        &holidays,
        &window.period,
        AttendanceSources {
            daily: &daily,
            summaries: &summaries,
            monthly: &monthly,
            salary_data: &salary_data,
        },
    )?;
    Ok(AttendanceRecordRow {
        employee_id: employee_id.to_string(),
        name: employee.full_name(),
        department: employee.department.clone(),
        attendance_percentage: attendance.attendance_percentage(),
        present_days: attendance.present_days,
        absent_days: attendance.absent_days,
        unmarked_days: attendance.unmarked_days,
        ot_hours: attendance.ot_hours,
        late_minutes: attendance.late_minutes,
        holiday_days: attendance.holiday_days,
        weekly_penalty_days: attendance.weekly_penalty_days,
        total_working_days: attendance.total_working_days,
        months: attendance.months,
    })
}

impl PayrollEngine {
    /// Reconciled attendance of every employee over the query window.
    ///
    /// Employees inactive before the window starts are left out, as are
    /// employees without a code.
    pub fn attendance_records(
        &self,
        tenant_id: TenantId,
        query: &AttendanceQuery,
    ) -> EngineResult<AttendanceReport> {
        let window = query.window()?;
        let params = cache_params(query, &window);
        let department = query.department_filter();

        self.cache()
            .get_or_compute(tenant_id, CacheScope::AttendanceRecords, &params, || {
                debug!(tenant_id = %tenant_id, %params, "computing attendance records");
                self.store().read(|t| {
                    t.active_tenant(tenant_id)?;
                    let mut rows = Vec::new();
                    for employee in t.employees_of(tenant_id) {
                        let Some(code) = employee.code() else { continue };
                        if !employee.is_payable_for(window.start)
                            || !department_matches(department.as_deref(), employee.department.as_deref())
                        {
                            continue;
                        }
                        rows.push(attendance_row(t, tenant_id, employee, code, &window)?);
                    }
                    rows.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
                    Ok(AttendanceReport {
                        time_period: query.time_period,
                        period_start: window.start,
                        period_end: window.end,
                        rows,
                    })
                })?
            })
    }

    /// Monthly and per-department chart rollups over the query window.
    pub fn frontend_charts(&self, tenant_id: TenantId, query: &ChartQuery) -> EngineResult<ChartReport> {
        let window = query.window()?;
        let params = cache_params(query, &window);
        let department = query.department_filter();

        self.cache()
            .get_or_compute(tenant_id, CacheScope::Charts, &params, || {
                debug!(tenant_id = %tenant_id, %params, "computing chart rollups");
                self.store().read(|t| {
                    t.active_tenant(tenant_id)?;
                    let rows: Vec<&ChartAggregatedData> = t
                        .charts
                        .values()
                        .filter(|row| {
                            row.key.tenant_id == tenant_id
                                && window.months.contains(&(row.key.year, row.key.month))
                                && department_matches(department.as_deref(), row.department.as_deref())
                        })
                        .collect();

                    let months = window
                        .months
                        .iter()
                        .map(|&(year, month)| {
                            let in_month: Vec<_> = rows
                                .iter()
                                .filter(|r| r.key.year == year && r.key.month == month)
                                .collect();
                            MonthlyChartPoint {
                                year,
                                month,
                                employees: in_month.len(),
                                total_gross: in_month.iter().map(|r| r.gross_salary).sum(),
                                total_net: in_month.iter().map(|r| r.net_salary).sum(),
                                total_ot_hours: in_month.iter().map(|r| r.ot_hours).sum(),
                                total_late_minutes: in_month.iter().map(|r| u64::from(r.late_minutes)).sum(),
                                average_attendance_percentage: average(
                                    in_month.iter().map(|r| r.attendance_percentage).sum(),
                                    in_month.len(),
                                ),
                            }
                        })
                        .collect();

                    let mut grouped: BTreeMap<String, Vec<&ChartAggregatedData>> = BTreeMap::new();
                    for row in &rows {
                        let name = row
                            .department
                            .as_deref()
                            .map(str::trim)
                            .filter(|d| !d.is_empty())
                            .unwrap_or(UNASSIGNED_DEPARTMENT);
                        grouped.entry(name.to_string()).or_default().push(*row);
                    }
                    let departments = grouped
                        .into_iter()
                        .map(|(department, rows)| DepartmentChartPoint {
                            employees: rows
                                .iter()
                                .map(|r| r.key.employee_id.as_str())
                                .collect::<BTreeSet<_>>()
                                .len(),
                            total_gross: rows.iter().map(|r| r.gross_salary).sum(),
                            total_net: rows.iter().map(|r| r.net_salary).sum(),
                            average_attendance_percentage: average(
                                rows.iter().map(|r| r.attendance_percentage).sum(),
                                rows.len(),
                            ),
                            department,
                        })
                        .collect();

                    Ok(ChartReport {
                        time_period: query.time_period,
                        months,
                        departments,
                    })
                })?
            })
    }

    /// Rebuilds every chart row of a tenant-month from the salary tables.
    /// Returns the number of chart rows afterwards.
    pub fn resync_charts(&self, tenant_id: TenantId, year: i32, month: u32) -> EngineResult<usize> {
        let rows = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let in_month = |k: &EmployeeMonth| k.tenant_id == tenant_id && k.year == year && k.month == month;
            let keys: BTreeSet<EmployeeMonth> = t
                .salaries
                .keys()
                .chain(t.salary_data.keys())
                .chain(t.charts.keys())
                .filter(|k| in_month(*k))
                .cloned()
                .collect();
            for key in &keys {
                upsert_chart_row(t, key);
            }
            Ok(keys.iter().filter(|k| t.charts.contains_key(*k)).count())
        })?;
        info!(tenant_id = %tenant_id, year, month, rows, "chart rows resynced");
        self.cache().invalidate(tenant_id, &[CacheScope::Charts]);
        Ok(rows)
    }
}
