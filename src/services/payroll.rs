//! Salary calculation batches, payment and period locking.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::PayrollEngine;
use super::pipeline::upsert_chart_row;
use crate::cache::CacheScope;
use crate::calculation::{
    AttendancePeriod, AttendanceSources, ReconciledAttendance, SalaryInputs, apply_repayment,
    calculate_salary, month_bounds, outstanding_balance, reconcile_attendance, tds_rate_for,
    working_days_in_month,
};
use crate::error::{EngineError, EngineResult, display_amount};
use crate::models::{
    CalculatedSalary, DataSource, Employee, EmployeeMonth, PayrollPeriod, SalaryData, SalaryState,
    Tenant, TenantId,
};
use crate::store::Tables;
use crate::tasks::BackgroundTask;

/// Overall result of a calculation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationStatus {
    /// The batch ran; per-employee errors may still be listed.
    Completed,
    /// The period is locked; nothing was written.
    Locked,
    /// The batch could not start.
    Failed,
}

/// Counts and errors of a calculation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSummary {
    /// Overall status.
    pub status: CalculationStatus,
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// The period's resolved data source.
    pub data_source: Option<DataSource>,
    /// New salary rows.
    pub calculated: usize,
    /// Existing rows recalculated or updated from uploads.
    pub updated: usize,
    /// Existing rows left as they were.
    pub unchanged: usize,
    /// Employees without any attendance or salary data.
    pub skipped: usize,
    /// One message per failed employee.
    pub errors: Vec<String>,
}

impl CalculationSummary {
    fn new(year: i32, month: u32) -> Self {
        Self {
            status: CalculationStatus::Completed,
            year,
            month,
            data_source: None,
            calculated: 0,
            updated: 0,
            unchanged: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    fn failed(mut self, error: String) -> Self {
        self.status = CalculationStatus::Failed;
        self.errors.push(error);
        self
    }
}

/// An employee payable for a period, with the state of their salary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleEmployee {
    /// Employee code.
    pub employee_id: String,
    /// Full name.
    pub name: String,
    /// Department.
    pub department: Option<String>,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Whether the employee is still active.
    pub is_active: bool,
    /// Salary row state for the period.
    pub salary_state: SalaryState,
    /// Any daily, summary or uploaded attendance exists for the month.
    pub has_attendance: bool,
    /// An uploaded salary row exists for the month.
    pub has_uploaded_salary: bool,
}

enum Outcome {
    Calculated,
    Updated,
    Unchanged,
    Skipped,
}

fn ensure_period<'a>(
    tables: &'a mut Tables,
    tenant_id: TenantId,
    year: i32,
    month: u32,
    tds_rate: Decimal,
) -> &'a mut PayrollPeriod {
    let data_source = DataSource::resolve(
        tables.has_salary_data_in_month(tenant_id, year, month),
        tables.has_daily_in_month(tenant_id, year, month),
    );
    let period = tables
        .periods
        .entry((tenant_id, year, month))
        .or_insert_with(|| PayrollPeriod {
            id: Uuid::new_v4(),
            tenant_id,
            year,
            month,
            data_source,
            working_days_in_month: working_days_in_month(year, month),
            tds_rate,
            is_locked: false,
        });
    if !period.is_locked {
        period.data_source = data_source;
    }
    period
}

/// Builds a salary row from an uploaded salary sheet row.
fn from_upload(
    employee: &Employee,
    tenant: &Tenant,
    period: &PayrollPeriod,
    row: &SalaryData,
    attendance: &ReconciledAttendance,
    advance_balance: Decimal,
) -> CalculatedSalary {
    let shift_hours = employee.shift_hours_per_day(tenant.break_time);
    let hour_denominator = (attendance.total_working_days + attendance.holiday_days) * shift_hours;
    let per_hour = if hour_denominator > Decimal::ZERO {
        (row.basic_salary / hour_denominator).round_dp(2)
    } else {
        Decimal::ZERO
    };
    let tds_percentage = if row.gross_salary > Decimal::ZERO {
        (row.tds_amount / row.gross_salary * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    };

    CalculatedSalary {
        id: Uuid::new_v4(),
        key: row.key.clone(),
        payroll_period_id: period.id,
        employee_name: employee.full_name(),
        department: employee.department.clone(),
        basic_salary: row.basic_salary,
        basic_salary_per_hour: per_hour,
        shift_hours_per_day: shift_hours,
        total_working_days: attendance.total_working_days,
        present_days: attendance.present_days,
        absent_days: attendance.absent_days,
        holiday_days: attendance.holiday_days,
        weekly_penalty_days: Decimal::ZERO,
        ot_hours: row.ot_hours,
        ot_rate_per_hour: employee.effective_ot_rate(tenant.break_time, tenant.average_days_per_month),
        ot_charges: row.ot_charges,
        late_minutes: row.late_minutes,
        late_deduction: row.late_deduction,
        salary_for_present_days: (row.gross_salary - row.ot_charges + row.late_deduction)
            .max(Decimal::ZERO),
        gross_salary: row.gross_salary,
        tds_percentage,
        tds_amount: row.tds_amount,
        salary_after_tds: row.gross_salary - row.tds_amount,
        advance_balance,
        advance_deduction_amount: row.advance_deduction,
        advance_deduction_editable: false,
        net_payable: row.net_payable,
        is_paid: row.is_paid,
        payment_date: row.payment_date,
        data_source: DataSource::Uploaded,
        calculated_at: Utc::now(),
    }
}

/// Builds a salary row from reconciled attendance.
fn from_attendance(
    employee: &Employee,
    tenant: &Tenant,
    period: &PayrollPeriod,
    key: EmployeeMonth,
    attendance: &ReconciledAttendance,
    advance_balance: Decimal,
) -> CalculatedSalary {
    let shift_hours = employee.shift_hours_per_day(tenant.break_time);
    let ot_rate = employee.effective_ot_rate(tenant.break_time, tenant.average_days_per_month);
    let tds_percentage = tds_rate_for(employee, period.tds_rate);
    let breakdown = calculate_salary(&SalaryInputs {
        basic_salary: employee.basic_salary,
        shift_hours_per_day: shift_hours,
        total_working_days: attendance.total_working_days,
        present_days: attendance.present_days,
        holiday_days: attendance.holiday_days,
        ot_hours: attendance.ot_hours,
        ot_rate_per_hour: ot_rate,
        late_minutes: attendance.late_minutes,
        tds_percentage,
        advance_balance,
    });

    CalculatedSalary {
        id: Uuid::new_v4(),
        key,
        payroll_period_id: period.id,
        employee_name: employee.full_name(),
        department: employee.department.clone(),
        basic_salary: employee.basic_salary,
        basic_salary_per_hour: breakdown.basic_salary_per_hour,
        shift_hours_per_day: shift_hours,
        total_working_days: attendance.total_working_days,
        present_days: attendance.present_days,
        absent_days: attendance.absent_days,
        holiday_days: attendance.holiday_days,
        weekly_penalty_days: attendance.weekly_penalty_days,
        ot_hours: attendance.ot_hours,
        ot_rate_per_hour: ot_rate,
        ot_charges: breakdown.ot_charges,
        late_minutes: attendance.late_minutes,
        late_deduction: breakdown.late_deduction,
        salary_for_present_days: breakdown.salary_for_present_days,
        gross_salary: breakdown.gross_salary,
        tds_percentage,
        tds_amount: breakdown.tds_amount,
        salary_after_tds: breakdown.salary_after_tds,
        advance_balance,
        advance_deduction_amount: breakdown.advance_deduction,
        advance_deduction_editable: true,
        net_payable: breakdown.net_payable,
        is_paid: false,
        payment_date: None,
        data_source: period.data_source,
        calculated_at: Utc::now(),
    }
}

/// Calculates and upserts one employee's salary inside a store transaction.
fn calculate_employee(
    tables: &mut Tables,
    tenant: &Tenant,
    period: &PayrollPeriod,
    employee: &Employee,
    employee_id: &str,
    force: bool,
) -> EngineResult<Outcome> {
    let (start, end) = month_bounds(period.year, period.month).ok_or_else(|| {
        EngineError::invalid_input("month", format!("{}-{} is not a valid month", period.year, period.month))
    })?;
    let key = EmployeeMonth::new(tenant.id, employee_id, period.year, period.month);
    let salary_row = tables.salary_data.get(&key).cloned();

    if let Some(existing) = tables.salaries.get_mut(&key).filter(|_| !force) {
        // Paid is terminal: an upload may promote a row to paid, never back.
        let promotion = salary_row
            .as_ref()
            .filter(|row| period.data_source == DataSource::Uploaded && row.is_paid && !existing.is_paid);
        let Some(row) = promotion else {
            return Ok(Outcome::Unchanged);
        };
        existing.is_paid = true;
        existing.payment_date = row.payment_date;
        existing.advance_deduction_editable = false;
        upsert_chart_row(tables, &key);
        return Ok(Outcome::Updated);
    }

    let daily = tables.daily_between(tenant.id, employee_id, start, end);
    let summaries: Vec<_> = tables.summaries.get(&key).cloned().into_iter().collect();
    let monthly: Vec<_> = tables.monthly.get(&key).cloned().into_iter().collect();
    let uploads: Vec<_> = salary_row.iter().cloned().collect();
    let holidays = tables.holidays_of(tenant.id);
    let attendance = reconcile_attendance(
        employee,
        &tenant.weekly_rules(),
        &holidays,
        &AttendancePeriod::month(period.year, period.month),
        AttendanceSources {
            daily: &daily,
            summaries: &summaries,
            monthly: &monthly,
            salary_data: &uploads,
        },
    )?;
    if salary_row.is_none() && !attendance.has_evidence() {
        return Ok(Outcome::Skipped);
    }

    let advance_balance = outstanding_balance(
        tables
            .advances
            .values()
            .filter(|a| a.tenant_id == tenant.id && a.employee_id == employee_id),
    );
    let mut salary = match (&salary_row, period.data_source) {
        (Some(row), DataSource::Uploaded) => {
            from_upload(employee, tenant, period, row, &attendance, advance_balance)
        }
        _ => from_attendance(employee, tenant, period, key.clone(), &attendance, advance_balance),
    };

    let outcome = match tables.salaries.get(&key) {
        Some(existing) => {
            salary.id = existing.id;
            if existing.is_paid {
                salary.is_paid = true;
                salary.payment_date = existing.payment_date;
                salary.advance_deduction_amount = existing
                    .advance_deduction_amount
                    .min(salary.salary_after_tds.max(Decimal::ZERO));
                if salary.advance_deduction_amount < existing.advance_deduction_amount {
                    warn!(
                        tenant_id = %tenant.id,
                        employee_id,
                        repaid = %existing.advance_deduction_amount,
                        kept = %salary.advance_deduction_amount,
                        "paid advance deduction exceeds recalculated salary; clamped"
                    );
                }
                salary.advance_deduction_editable = false;
                salary.recompute_net_payable();
            }
            Outcome::Updated
        }
        None => Outcome::Calculated,
    };
    tables.salaries.insert(key.clone(), salary);
    upsert_chart_row(tables, &key);
    Ok(outcome)
}

impl PayrollEngine {
    /// Calculates the salaries of every payable employee for a month.
    ///
    /// Never fails: problems are reported through the summary's status and
    /// error list. Each employee is upserted in its own transaction, so one
    /// failure does not stop the batch. Existing rows are only recalculated
    /// with `force_recalculate`; a locked period is never recalculated.
    pub fn calculate_salary_for_period(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
        force_recalculate: bool,
    ) -> CalculationSummary {
        let mut summary = CalculationSummary::new(year, month);
        let Some((month_start, _)) = month_bounds(year, month) else {
            return summary.failed(format!("{year}-{month} is not a valid month"));
        };
        let tds_rate = self.config().tenant_defaults.tds_rate;

        let prepared = self.store().write(|t| {
            let tenant = t.active_tenant(tenant_id)?.clone();
            let period = ensure_period(t, tenant_id, year, month, tds_rate).clone();
            let mut candidates: Vec<Employee> = t
                .employees_of(tenant_id)
                .filter(|e| e.is_payable_for(month_start))
                .cloned()
                .collect();
            candidates.sort_by(|a, b| a.code().cmp(&b.code()).then(a.id.cmp(&b.id)));
            Ok((tenant, period, candidates))
        });
        let (tenant, period, candidates) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(tenant_id = %tenant_id, year, month, error = %err, "salary batch could not start");
                return summary.failed(err.to_string());
            }
        };
        summary.data_source = Some(period.data_source);
        if period.is_locked {
            info!(tenant_id = %tenant_id, year, month, "payroll period locked; batch skipped");
            summary.status = CalculationStatus::Locked;
            return summary;
        }

        for employee in &candidates {
            let Some(employee_id) = employee.code() else {
                summary
                    .errors
                    .push(format!("{}: no employee_id", employee.full_name()));
                continue;
            };
            let result = self.store().write(|t| {
                calculate_employee(t, &tenant, &period, employee, employee_id, force_recalculate)
            });
            match result {
                Ok(Outcome::Calculated) => summary.calculated += 1,
                Ok(Outcome::Updated) => summary.updated += 1,
                Ok(Outcome::Unchanged) => summary.unchanged += 1,
                Ok(Outcome::Skipped) => summary.skipped += 1,
                Err(err) => {
                    warn!(
                        tenant_id = %tenant_id,
                        employee_id,
                        year,
                        month,
                        error = %err,
                        "salary calculation failed"
                    );
                    summary.errors.push(format!("{employee_id}: {err}"));
                }
            }
        }

        info!(
            tenant_id = %tenant_id,
            year,
            month,
            data_source = ?period.data_source,
            calculated = summary.calculated,
            updated = summary.updated,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "salary batch completed"
        );
        self.cache()
            .invalidate(tenant_id, &[CacheScope::Charts, CacheScope::EligibleEmployees]);
        self.submit(BackgroundTask::ChartResync {
            tenant_id,
            year,
            month,
        });
        summary
    }

    /// Marks a salary paid and repays advances oldest-first by its advance
    /// deduction.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown salary and
    /// [`EngineError::SalaryAlreadyPaid`] when it was paid before.
    pub fn mark_salary_as_paid(
        &self,
        tenant_id: TenantId,
        salary_id: Uuid,
        payment_date: NaiveDate,
    ) -> EngineResult<CalculatedSalary> {
        let (salary, outcome) = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let (key, deduction) = {
                let salary = t.salary_by_id_mut(tenant_id, salary_id)?;
                if salary.is_paid {
                    return Err(EngineError::SalaryAlreadyPaid {
                        employee_id: salary.key.employee_id.clone(),
                        year: salary.key.year,
                        month: salary.key.month,
                    });
                }
                (salary.key.clone(), salary.advance_deduction_amount)
            };

            let mut advances = t.advances_of(tenant_id, &key.employee_id);
            let outcome = apply_repayment(&mut advances, deduction);
            for advance in advances {
                if outcome.touched.contains(&advance.id) {
                    t.advances.insert(advance.id, advance);
                }
            }

            let salary = t.salary_by_id_mut(tenant_id, salary_id)?;
            salary.is_paid = true;
            salary.payment_date = Some(payment_date);
            salary.advance_deduction_editable = false;
            let paid = salary.clone();
            upsert_chart_row(t, &key);
            Ok((paid, outcome))
        })?;

        if outcome.unapplied > Decimal::ZERO {
            warn!(
                tenant_id = %tenant_id,
                employee_id = %salary.key.employee_id,
                unapplied = %outcome.unapplied,
                "advance deduction exceeds outstanding advances"
            );
        }
        info!(
            tenant_id = %tenant_id,
            employee_id = %salary.key.employee_id,
            year = salary.key.year,
            month = salary.key.month,
            repaid = %outcome.applied,
            "salary marked paid"
        );
        self.cache()
            .invalidate(tenant_id, &[CacheScope::Charts, CacheScope::EligibleEmployees]);
        Ok(salary)
    }

    /// Overrides the advance deduction of an unpaid salary and recomputes
    /// its net payable.
    pub fn update_advance_deduction(
        &self,
        tenant_id: TenantId,
        salary_id: Uuid,
        amount: Decimal,
    ) -> EngineResult<CalculatedSalary> {
        if amount < Decimal::ZERO {
            return Err(EngineError::invalid_input("advance_deduction", "must not be negative"));
        }
        let salary = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let salary = t.salary_by_id_mut(tenant_id, salary_id)?;
            if salary.is_paid {
                return Err(EngineError::SalaryAlreadyPaid {
                    employee_id: salary.key.employee_id.clone(),
                    year: salary.key.year,
                    month: salary.key.month,
                });
            }
            if !salary.advance_deduction_editable {
                return Err(EngineError::invalid_input(
                    "advance_deduction",
                    "is not editable for this salary",
                ));
            }
            if amount > salary.advance_balance {
                return Err(EngineError::invalid_input(
                    "advance_deduction",
                    format!(
                        "exceeds the outstanding advance balance of {}",
                        display_amount(salary.advance_balance)
                    ),
                ));
            }
            if amount > salary.salary_after_tds {
                return Err(EngineError::invalid_input(
                    "advance_deduction",
                    format!(
                        "exceeds the salary after TDS of {}",
                        display_amount(salary.salary_after_tds)
                    ),
                ));
            }
            salary.advance_deduction_amount = amount.round_dp(2);
            salary.recompute_net_payable();
            let updated = salary.clone();
            upsert_chart_row(t, &updated.key);
            Ok(updated)
        })?;

        info!(
            tenant_id = %tenant_id,
            employee_id = %salary.key.employee_id,
            amount = %salary.advance_deduction_amount,
            "advance deduction overridden"
        );
        self.cache().invalidate(tenant_id, &[CacheScope::Charts]);
        Ok(salary)
    }

    /// Locks a period against recalculation, creating it if needed.
    pub fn lock_period(&self, tenant_id: TenantId, year: i32, month: u32) -> EngineResult<PayrollPeriod> {
        if month_bounds(year, month).is_none() {
            return Err(EngineError::invalid_input("month", format!("{year}-{month} is not a valid month")));
        }
        let tds_rate = self.config().tenant_defaults.tds_rate;
        let period = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let period = ensure_period(t, tenant_id, year, month, tds_rate);
            period.is_locked = true;
            Ok(period.clone())
        })?;
        info!(tenant_id = %tenant_id, year, month, "payroll period locked");
        Ok(period)
    }

    /// Unlocks a period.
    pub fn unlock_period(&self, tenant_id: TenantId, year: i32, month: u32) -> EngineResult<PayrollPeriod> {
        let period = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            let period = t
                .periods
                .get_mut(&(tenant_id, year, month))
                .ok_or_else(|| EngineError::not_found("payroll period", format!("{year}-{month:02}")))?;
            period.is_locked = false;
            Ok(period.clone())
        })?;
        info!(tenant_id = %tenant_id, year, month, "payroll period unlocked");
        Ok(period)
    }

    /// The payroll period of a month, if it was ever calculated or locked.
    pub fn payroll_period(&self, tenant_id: TenantId, year: i32, month: u32) -> EngineResult<PayrollPeriod> {
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            t.periods
                .get(&(tenant_id, year, month))
                .cloned()
                .ok_or_else(|| EngineError::not_found("payroll period", format!("{year}-{month:02}")))
        })?
    }

    /// Calculated salaries of a month, ordered by employee code.
    pub fn salaries_for_period(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<CalculatedSalary>> {
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            let mut salaries: Vec<CalculatedSalary> = t
                .salaries
                .iter()
                .filter(|(k, _)| k.tenant_id == tenant_id && k.year == year && k.month == month)
                .map(|(_, s)| s.clone())
                .collect();
            salaries.sort_by(|a, b| a.key.employee_id.cmp(&b.key.employee_id));
            Ok(salaries)
        })?
    }

    /// Employees payable for a month with the state of their salary rows.
    /// Employees without a code are left out.
    pub fn eligible_employees(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<EligibleEmployee>> {
        let (month_start, month_end) = month_bounds(year, month).ok_or_else(|| {
            EngineError::invalid_input("month", format!("{year}-{month} is not a valid month"))
        })?;
        let params = format!("{year}-{month:02}");
        self.cache()
            .get_or_compute(tenant_id, CacheScope::EligibleEmployees, &params, || {
                self.store().read(|t| {
                    t.active_tenant(tenant_id)?;
                    let mut eligible: Vec<EligibleEmployee> = t
                        .employees_of(tenant_id)
                        .filter(|e| e.is_payable_for(month_start))
                        .filter_map(|e| {
                            let code = e.code()?;
                            let key = EmployeeMonth::new(tenant_id, code, year, month);
                            let has_attendance = t.summaries.contains_key(&key)
                                || t.monthly.contains_key(&key)
                                || !t.daily_between(tenant_id, code, month_start, month_end).is_empty();
                            Some(EligibleEmployee {
                                employee_id: code.to_string(),
                                name: e.full_name(),
                                department: e.department.clone(),
                                basic_salary: e.basic_salary,
                                is_active: e.is_active,
                                salary_state: SalaryState::of(t.salaries.get(&key)),
                                has_attendance,
                                has_uploaded_salary: t.salary_data.contains_key(&key),
                            })
                        })
                        .collect();
                    eligible.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
                    Ok(eligible)
                })?
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{AdvanceStatus, AttendanceStatus, DailyAttendanceRecord};
    use crate::services::NewEmployee;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn setup() -> (PayrollEngine, TenantId, String) {
        let engine = PayrollEngine::new(EngineConfig::default());
        let tenant = engine.create_tenant("Acme").unwrap();
        let employee = engine
            .create_employee(tenant.id, NewEmployee::new("Asha", "Rao", dec("25000")))
            .unwrap();
        (engine, tenant.id, employee.employee_id.unwrap())
    }

    fn present(engine: &PayrollEngine, tenant: TenantId, code: &str, days: impl IntoIterator<Item = u32>) {
        for d in days {
            engine
                .record_daily_attendance(
                    tenant,
                    DailyAttendanceRecord::new(tenant, code, date(d), AttendanceStatus::Present),
                )
                .unwrap();
        }
    }

    #[test]
    fn test_frontend_batch_then_unchanged() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2, 3, 4]);

        let first = engine.calculate_salary_for_period(tenant, 2025, 6, false);
        assert_eq!(first.status, CalculationStatus::Completed);
        assert_eq!(first.data_source, Some(DataSource::Frontend));
        assert_eq!(first.calculated, 1);

        let second = engine.calculate_salary_for_period(tenant, 2025, 6, false);
        assert_eq!(second.unchanged, 1);

        let forced = engine.calculate_salary_for_period(tenant, 2025, 6, true);
        assert_eq!(forced.updated, 1);
        let salaries = engine.salaries_for_period(tenant, 2025, 6).unwrap();
        assert_eq!(salaries.len(), 1);
        // 25000 / 25 working days x 3 present days
        assert_eq!(salaries[0].gross_salary, dec("3000"));
    }

    #[test]
    fn test_force_keeps_row_id() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2]);
        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let before = engine.salaries_for_period(tenant, 2025, 6).unwrap()[0].id;
        present(&engine, tenant, &code, [3]);
        engine.calculate_salary_for_period(tenant, 2025, 6, true);
        let after = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert_eq!(after.id, before);
        assert_eq!(after.present_days, dec("2"));
    }

    #[test]
    fn test_locked_period_blocks_even_forced_batch() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2]);
        engine.lock_period(tenant, 2025, 6).unwrap();

        let summary = engine.calculate_salary_for_period(tenant, 2025, 6, true);
        assert_eq!(summary.status, CalculationStatus::Locked);
        assert!(engine.salaries_for_period(tenant, 2025, 6).unwrap().is_empty());

        engine.unlock_period(tenant, 2025, 6).unwrap();
        let summary = engine.calculate_salary_for_period(tenant, 2025, 6, false);
        assert_eq!(summary.calculated, 1);
    }

    #[test]
    fn test_employee_without_evidence_skipped() {
        let (engine, tenant, _) = setup();
        let summary = engine.calculate_salary_for_period(tenant, 2025, 6, false);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.calculated, 0);
    }

    #[test]
    fn test_unknown_tenant_fails_softly() {
        let engine = PayrollEngine::new(EngineConfig::default());
        let summary = engine.calculate_salary_for_period(Uuid::new_v4(), 2025, 6, false);
        assert_eq!(summary.status, CalculationStatus::Failed);
        assert_eq!(summary.errors.len(), 1);
    }

    #[test]
    fn test_mark_paid_repays_advances_and_rejects_twice() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, 2..=28);
        engine
            .create_advance(tenant, &code, dec("1000"), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .unwrap();
        engine
            .create_advance(tenant, &code, dec("500"), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap();
        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert_eq!(salary.advance_deduction_amount, dec("1500"));

        let updated = engine
            .update_advance_deduction(tenant, salary.id, dec("800"))
            .unwrap();
        assert_eq!(updated.net_payable, updated.salary_after_tds - dec("800"));

        let paid = engine.mark_salary_as_paid(tenant, salary.id, date(30)).unwrap();
        assert!(paid.is_paid);
        let advances = engine.advances(tenant, &code).unwrap();
        assert_eq!(advances[0].status, AdvanceStatus::Repaid);
        assert_eq!(advances[1].status, AdvanceStatus::PartiallyPaid);
        assert_eq!(advances[1].remaining_balance, dec("700"));

        let err = engine.mark_salary_as_paid(tenant, salary.id, date(30)).unwrap_err();
        assert!(err.is_locked());
        let err = engine
            .update_advance_deduction(tenant, salary.id, dec("100"))
            .unwrap_err();
        assert!(err.is_locked());
    }

    #[test]
    fn test_advance_override_bounded_by_balance() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2]);
        engine
            .create_advance(tenant, &code, dec("100"), date(1))
            .unwrap();
        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);

        let err = engine
            .update_advance_deduction(tenant, salary.id, dec("150"))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("100"));
        assert!(engine
            .update_advance_deduction(tenant, salary.id, dec("-1"))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_force_on_paid_row_keeps_payment() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2, 3]);
        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        engine.mark_salary_as_paid(tenant, salary.id, date(30)).unwrap();

        present(&engine, tenant, &code, [4]);
        engine.calculate_salary_for_period(tenant, 2025, 6, true);
        let recalculated = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert!(recalculated.is_paid);
        assert_eq!(recalculated.payment_date, Some(date(30)));
        assert!(!recalculated.advance_deduction_editable);
        assert_eq!(recalculated.present_days, dec("3"));
    }

    fn uploaded(tenant: TenantId, code: &str, is_paid: bool) -> SalaryData {
        SalaryData {
            key: EmployeeMonth::new(tenant, code, 2025, 6),
            employee_name: "Asha Rao".into(),
            department: None,
            basic_salary: dec("25000"),
            days_present: dec("24"),
            days_absent: dec("1"),
            total_working_days: Some(dec("25")),
            ot_hours: Decimal::ZERO,
            late_minutes: 0,
            ot_charges: Decimal::ZERO,
            late_deduction: Decimal::ZERO,
            gross_salary: dec("24000"),
            tds_amount: Decimal::ZERO,
            advance_deduction: dec("500"),
            net_payable: dec("23500"),
            is_paid,
            payment_date: is_paid.then(|| date(28)),
        }
    }

    #[test]
    fn test_rerun_never_unpays_a_paid_upload_row() {
        let (engine, tenant, code) = setup();
        engine
            .create_advance(tenant, &code, dec("500"), NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
            .unwrap();
        engine
            .import_salary_data(tenant, vec![uploaded(tenant, &code, false)])
            .unwrap();
        let first = engine.calculate_salary_for_period(tenant, 2025, 6, false);
        assert_eq!(first.data_source, Some(DataSource::Uploaded));
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        engine.mark_salary_as_paid(tenant, salary.id, date(30)).unwrap();

        let rerun = engine.calculate_salary_for_period(tenant, 2025, 6, false);
        assert_eq!(rerun.unchanged, 1);
        assert_eq!(rerun.updated, 0);
        let after = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert!(after.is_paid);
        assert_eq!(after.payment_date, Some(date(30)));
        assert!(engine
            .mark_salary_as_paid(tenant, salary.id, date(30))
            .unwrap_err()
            .is_locked());
        let advances = engine.advances(tenant, &code).unwrap();
        assert_eq!(advances[0].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_rerun_promotes_upload_marked_paid() {
        let (engine, tenant, code) = setup();
        engine
            .import_salary_data(tenant, vec![uploaded(tenant, &code, false)])
            .unwrap();
        engine.calculate_salary_for_period(tenant, 2025, 6, false);

        engine
            .import_salary_data(tenant, vec![uploaded(tenant, &code, true)])
            .unwrap();
        let rerun = engine.calculate_salary_for_period(tenant, 2025, 6, false);
        assert_eq!(rerun.updated, 1);
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert!(salary.is_paid);
        assert_eq!(salary.payment_date, Some(date(28)));
        assert!(!salary.advance_deduction_editable);
    }

    #[test]
    fn test_advance_override_bounded_by_salary_after_tds() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2]);
        engine
            .create_advance(tenant, &code, dec("50000"), date(1))
            .unwrap();
        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert_eq!(salary.salary_after_tds, dec("1000"));
        assert_eq!(salary.advance_deduction_amount, dec("1000"));

        let err = engine
            .update_advance_deduction(tenant, salary.id, dec("20000"))
            .unwrap_err();
        assert!(err.is_validation());
        let unchanged = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert_eq!(unchanged.net_payable, Decimal::ZERO);

        let updated = engine
            .update_advance_deduction(tenant, salary.id, dec("400"))
            .unwrap();
        assert_eq!(updated.net_payable, dec("600"));
    }

    #[test]
    fn test_forced_rerun_clamps_paid_deduction() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2, 3, 4]);
        engine
            .create_advance(tenant, &code, dec("3000"), date(1))
            .unwrap();
        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert_eq!(salary.advance_deduction_amount, dec("3000"));
        engine.mark_salary_as_paid(tenant, salary.id, date(30)).unwrap();

        engine.delete_daily_attendance(tenant, &code, date(3)).unwrap();
        engine.delete_daily_attendance(tenant, &code, date(4)).unwrap();
        engine.calculate_salary_for_period(tenant, 2025, 6, true);

        let recalculated = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert!(recalculated.is_paid);
        assert_eq!(recalculated.salary_after_tds, dec("1000"));
        assert_eq!(recalculated.advance_deduction_amount, dec("1000"));
        assert_eq!(recalculated.net_payable, Decimal::ZERO);
    }

    #[test]
    fn test_eligible_employees_reflect_salary_state() {
        let (engine, tenant, code) = setup();
        present(&engine, tenant, &code, [2]);

        let before = engine.eligible_employees(tenant, 2025, 6).unwrap();
        assert_eq!(before[0].salary_state, SalaryState::Absent);
        assert!(before[0].has_attendance);

        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let after = engine.eligible_employees(tenant, 2025, 6).unwrap();
        assert_eq!(after[0].salary_state, SalaryState::Calculated);
    }
}
