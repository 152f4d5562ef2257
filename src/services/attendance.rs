//! Attendance writes: daily records, spreadsheet imports and the weekly
//! bonus.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::PayrollEngine;
use super::pipeline::{refresh_month_aggregates, upsert_chart_row};
use crate::cache::CacheScope;
use crate::calculation::{BonusDecision, evaluate_weekly_bonus, month_bounds, week_start};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceSource, AttendanceStatus, DailyAttendanceRecord, EmployeeMonth, MonthlyAttendance,
    MonthlyAttendanceSummary, SalaryData, TenantId,
};
use crate::store::Tables;

/// Outcome of a bulk import. Rejected rows do not stop the import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows stored.
    pub imported: usize,
    /// One message per rejected row.
    pub errors: Vec<String>,
}

fn check_import_key(tables: &Tables, key: &EmployeeMonth) -> EngineResult<()> {
    if month_bounds(key.year, key.month).is_none() {
        return Err(EngineError::invalid_input(
            "month",
            format!("{}-{} is not a valid month", key.year, key.month),
        ));
    }
    tables.employee_by_code(key.tenant_id, &key.employee_id)?;
    Ok(())
}

fn check_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(field, "must not be negative"));
    }
    Ok(())
}

fn row_label(key: &EmployeeMonth) -> String {
    format!("{} ({}-{:02})", key.employee_id, key.year, key.month)
}

impl PayrollEngine {
    /// Creates or replaces the daily record of an employee and date.
    ///
    /// The month summary and rollup are rebuilt in the same transaction;
    /// caches are invalidated and the weekly bonus check is queued after
    /// the commit.
    ///
    /// # Errors
    ///
    /// Fails when the tenant or employee does not exist, or when OT hours
    /// are negative.
    pub fn record_daily_attendance(
        &self,
        tenant_id: TenantId,
        record: DailyAttendanceRecord,
    ) -> EngineResult<DailyAttendanceRecord> {
        self.write_daily(tenant_id, record, true)
    }

    fn write_daily(
        &self,
        tenant_id: TenantId,
        mut record: DailyAttendanceRecord,
        trigger_bonus: bool,
    ) -> EngineResult<DailyAttendanceRecord> {
        check_non_negative("ot_hours", record.ot_hours)?;
        record.tenant_id = tenant_id;
        record.employee_id = record.employee_id.trim().to_string();

        let stored = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            t.employee_by_code(tenant_id, &record.employee_id)?;

            let key = (tenant_id, record.employee_id.clone(), record.date);
            if let Some(existing) = t.daily.get(&key) {
                record.id = existing.id;
            }
            t.daily.insert(key, record.clone());

            if let Err(err) = refresh_month_aggregates(
                t,
                tenant_id,
                &record.employee_id,
                record.date.year(),
                record.date.month(),
            ) {
                warn!(
                    tenant_id = %tenant_id,
                    employee_id = %record.employee_id,
                    error = %err,
                    "monthly aggregate refresh failed"
                );
            }
            Ok(record)
        })?;

        info!(
            tenant_id = %tenant_id,
            employee_id = %stored.employee_id,
            date = %stored.date,
            status = ?stored.status,
            "daily attendance recorded"
        );
        self.after_attendance_write(tenant_id, &stored.employee_id, stored.date, trigger_bonus);
        Ok(stored)
    }

    /// Deletes a daily record and rebuilds its month.
    pub fn delete_daily_attendance(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<()> {
        self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let key = (tenant_id, employee_id.to_string(), date);
            if t.daily.remove(&key).is_none() {
                return Err(EngineError::not_found(
                    "attendance record",
                    format!("{employee_id} on {date}"),
                ));
            }
            if let Err(err) =
                refresh_month_aggregates(t, tenant_id, employee_id, date.year(), date.month())
            {
                warn!(tenant_id = %tenant_id, employee_id, error = %err, "monthly aggregate refresh failed");
            }
            Ok(())
        })?;

        info!(tenant_id = %tenant_id, employee_id, date = %date, "daily attendance deleted");
        self.after_attendance_write(tenant_id, employee_id, date, false);
        Ok(())
    }

    /// Daily records of an employee within `start..=end`, oldest first.
    pub fn daily_attendance(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<DailyAttendanceRecord>> {
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            Ok(t.daily_between(tenant_id, employee_id, start, end))
        })?
    }

    /// The rolled-up summary of an employee-month, if any daily record
    /// exists.
    pub fn monthly_summary(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Option<MonthlyAttendanceSummary>> {
        let key = EmployeeMonth::new(tenant_id, employee_id, year, month);
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            Ok(t.summaries.get(&key).cloned())
        })?
    }

    /// Stores uploaded monthly attendance rows, replacing earlier uploads of
    /// the same employee-month.
    pub fn import_uploaded_attendance(
        &self,
        tenant_id: TenantId,
        rows: Vec<MonthlyAttendance>,
    ) -> EngineResult<ImportReport> {
        let report = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let mut report = ImportReport::default();
            for mut row in rows {
                row.key.tenant_id = tenant_id;
                row.source = AttendanceSource::ExcelUpload;
                let checked = check_import_key(t, &row.key)
                    .and_then(|()| check_non_negative("present_days", row.present_days))
                    .and_then(|()| check_non_negative("absent_days", row.absent_days))
                    .and_then(|()| check_non_negative("ot_hours", row.ot_hours));
                match checked {
                    Ok(()) => {
                        t.monthly.insert(row.key.clone(), row);
                        report.imported += 1;
                    }
                    Err(err) => report.errors.push(format!("{}: {err}", row_label(&row.key))),
                }
            }
            Ok(report)
        })?;

        info!(
            tenant_id = %tenant_id,
            imported = report.imported,
            rejected = report.errors.len(),
            "uploaded attendance imported"
        );
        self.cache()
            .invalidate(tenant_id, &CacheScope::ATTENDANCE_WRITE);
        Ok(report)
    }

    /// Stores uploaded salary rows and refreshes their chart rows.
    pub fn import_salary_data(
        &self,
        tenant_id: TenantId,
        rows: Vec<SalaryData>,
    ) -> EngineResult<ImportReport> {
        let report = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let mut report = ImportReport::default();
            for mut row in rows {
                row.key.tenant_id = tenant_id;
                let checked = check_import_key(t, &row.key)
                    .and_then(|()| check_non_negative("days_present", row.days_present))
                    .and_then(|()| check_non_negative("days_absent", row.days_absent))
                    .and_then(|()| check_non_negative("basic_salary", row.basic_salary));
                match checked {
                    Ok(()) => {
                        let key = row.key.clone();
                        t.salary_data.insert(key.clone(), row);
                        upsert_chart_row(t, &key);
                        report.imported += 1;
                    }
                    Err(err) => report.errors.push(format!("{}: {err}", row_label(&row.key))),
                }
            }
            Ok(report)
        })?;

        info!(
            tenant_id = %tenant_id,
            imported = report.imported,
            rejected = report.errors.len(),
            "salary data imported"
        );
        self.cache()
            .invalidate(tenant_id, &CacheScope::ATTENDANCE_WRITE);
        Ok(report)
    }

    /// Evaluates the weekly bonus for the week containing `date` against
    /// the current records and marks the bonus day PRESENT when earned.
    ///
    /// Safe to run repeatedly: a bonus day already PRESENT is left alone.
    pub fn apply_weekly_bonus(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<BonusDecision> {
        let monday = week_start(date);
        let (rules, employee, week) = self.store().read(|t| {
            let rules = t.active_tenant(tenant_id)?.weekly_rules();
            let employee = t.employee_by_code(tenant_id, employee_id)?.clone();
            let week = t.daily_between(tenant_id, employee_id, monday, monday + Duration::days(6));
            Ok::<_, EngineError>((rules, employee, week))
        })??;

        let decision = evaluate_weekly_bonus(&employee, &rules, date, &week);
        if let BonusDecision::Grant { date: bonus_date } = decision {
            let record = match week.into_iter().find(|r| r.date == bonus_date) {
                Some(existing) => DailyAttendanceRecord {
                    status: AttendanceStatus::Present,
                    ..existing
                },
                None => DailyAttendanceRecord::new(
                    tenant_id,
                    employee_id,
                    bonus_date,
                    AttendanceStatus::Present,
                ),
            };
            self.write_daily(tenant_id, record, false)?;
            info!(
                tenant_id = %tenant_id,
                employee_id,
                bonus_date = %bonus_date,
                "weekly bonus day granted"
            );
        }
        Ok(decision)
    }
}
