//! Write-driven recomputation of derived rows and cache invalidation.
//!
//! Attendance writes rebuild the employee-month summary and the daily
//! rollup inside the writing transaction. Afterwards the tenant's cached
//! reads are invalidated and the weekly bonus check is queued. Salary
//! writes refresh the chart row. Failures here are logged and swallowed so
//! the originating write always stands.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::PayrollEngine;
use crate::cache::CacheScope;
use crate::calculation::{DailyTotals, count_working_days, month_bounds, weekly_penalty_days};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceSource, ChartAggregatedData, EmployeeMonth, MonthlyAttendance,
    MonthlyAttendanceSummary, TenantId,
};
use crate::store::Tables;
use crate::tasks::BackgroundTask;

/// Rebuilds the summary and daily rollup of one employee-month from its
/// daily records. Both rows are dropped once no daily record remains.
/// Uploaded monthly rows are never touched.
pub(crate) fn refresh_month_aggregates(
    tables: &mut Tables,
    tenant_id: TenantId,
    employee_id: &str,
    year: i32,
    month: u32,
) -> EngineResult<()> {
    let (start, end) = month_bounds(year, month).ok_or_else(|| {
        EngineError::invalid_input("month", format!("{year}-{month} is not a valid month"))
    })?;
    let rules = tables.active_tenant(tenant_id)?.weekly_rules();
    let employee = tables.employee_by_code(tenant_id, employee_id)?.clone();
    let records = tables.daily_between(tenant_id, employee_id, start, end);
    let key = EmployeeMonth::new(tenant_id, employee_id, year, month);
    let has_upload = tables
        .monthly
        .get(&key)
        .is_some_and(MonthlyAttendance::is_upload);

    if records.is_empty() {
        tables.summaries.remove(&key);
        if !has_upload {
            tables.monthly.remove(&key);
        }
        return Ok(());
    }

    let totals = DailyTotals::from_records(&records);
    let penalty = Decimal::from(weekly_penalty_days(
        &records,
        &rules,
        employee.weekly_rules_enabled,
        start,
        end,
    ));
    tables.summaries.insert(
        key.clone(),
        MonthlyAttendanceSummary {
            key: key.clone(),
            present_days: totals.present_days,
            absent_days: totals.absent_days,
            unmarked_days: totals.unmarked_days,
            ot_hours: totals.ot_hours,
            late_minutes: totals.late_minutes,
            weekly_penalty_days: penalty,
        },
    );

    if !has_upload {
        let holidays = tables.holidays_of(tenant_id);
        let working = count_working_days(&employee, start, end, &holidays);
        tables.monthly.insert(
            key.clone(),
            MonthlyAttendance {
                key,
                source: AttendanceSource::DailyRollup,
                present_days: (totals.present_days - penalty).max(Decimal::ZERO),
                absent_days: totals.absent_days + penalty,
                ot_hours: totals.ot_hours,
                late_minutes: totals.late_minutes,
                total_working_days: Some(Decimal::from(working.net)),
            },
        );
    }
    Ok(())
}

/// Points the chart row of `key` at its best source: the calculated salary,
/// else the uploaded salary row. Removes the chart row when neither exists.
pub(crate) fn upsert_chart_row(tables: &mut Tables, key: &EmployeeMonth) {
    let row = tables
        .salaries
        .get(key)
        .map(ChartAggregatedData::from)
        .or_else(|| tables.salary_data.get(key).map(ChartAggregatedData::from));
    match row {
        Some(row) => {
            tables.charts.insert(key.clone(), row);
        }
        None => {
            tables.charts.remove(key);
        }
    }
}

impl PayrollEngine {
    /// Runs the attendance pipeline for a daily row written outside
    /// [`PayrollEngine::record_daily_attendance`].
    ///
    /// Never fails; problems are logged.
    pub fn on_attendance_write(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        date: NaiveDate,
        trigger_bonus: bool,
    ) {
        let refreshed = self.store().write(|t| {
            refresh_month_aggregates(t, tenant_id, employee_id, date.year(), date.month())
        });
        if let Err(err) = refreshed {
            warn!(
                tenant_id = %tenant_id,
                employee_id,
                year = date.year(),
                month = date.month(),
                error = %err,
                "monthly aggregate refresh failed"
            );
        }
        self.after_attendance_write(tenant_id, employee_id, date, trigger_bonus);
    }

    /// Post-commit steps of an attendance write: cache invalidation, then
    /// the weekly bonus check when the tenant enables it.
    pub(crate) fn after_attendance_write(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        date: NaiveDate,
        trigger_bonus: bool,
    ) {
        self.cache()
            .invalidate(tenant_id, &CacheScope::ATTENDANCE_WRITE);

        if !trigger_bonus {
            return;
        }
        let bonus_enabled = self
            .store()
            .read(|t| t.active_tenant(tenant_id).map(|t| t.sunday_bonus_enabled));
        match bonus_enabled {
            Ok(Ok(true)) => self.submit(BackgroundTask::SundayBonusCheck {
                tenant_id,
                employee_id: employee_id.to_string(),
                date,
            }),
            Ok(Ok(false)) => {
                debug!(tenant_id = %tenant_id, employee_id, "weekly bonus disabled for tenant")
            }
            Ok(Err(err)) | Err(err) => warn!(
                tenant_id = %tenant_id,
                employee_id,
                error = %err,
                "weekly bonus check not scheduled"
            ),
        }
    }

    /// Refreshes the chart row of an employee-month after a salary write
    /// and invalidates the tenant's chart caches.
    ///
    /// Never fails; problems are logged.
    pub fn on_salary_write(&self, tenant_id: TenantId, employee_id: &str, year: i32, month: u32) {
        let key = EmployeeMonth::new(tenant_id, employee_id, year, month);
        let upserted = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            upsert_chart_row(t, &key);
            Ok(())
        });
        if let Err(err) = upserted {
            warn!(
                tenant_id = %tenant_id,
                employee_id,
                year,
                month,
                error = %err,
                "chart row refresh failed"
            );
        }
        self.cache().invalidate(tenant_id, &[CacheScope::Charts]);
    }
}
