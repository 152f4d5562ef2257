//! Tenant lifecycle: creation, settings, credits, soft delete and purge.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::{info, warn};

use super::PayrollEngine;
use super::pipeline::refresh_month_aggregates;
use crate::cache::CacheScope;
use crate::error::{EngineError, EngineResult};
use crate::models::{Tenant, TenantId, WeeklyRuleSettings};

const ALL_SCOPES: [CacheScope; 3] = CacheScope::ATTENDANCE_WRITE;

impl PayrollEngine {
    /// Creates a tenant with the configured defaults.
    pub fn create_tenant(&self, name: &str) -> EngineResult<Tenant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::invalid_input("name", "tenant name is required"));
        }
        let tenant = Tenant::new(name, &self.config().tenant_defaults);
        let created = tenant.clone();
        self.store().write(move |t| {
            t.tenants.insert(tenant.id, tenant);
            Ok(())
        })?;
        info!(tenant_id = %created.id, "tenant created");
        Ok(created)
    }

    /// An active tenant.
    pub fn tenant(&self, tenant_id: TenantId) -> EngineResult<Tenant> {
        self.store()
            .read(|t| t.active_tenant(tenant_id).cloned())?
    }

    /// Replaces the tenant's weekly penalty and bonus settings.
    pub fn update_weekly_rules(
        &self,
        tenant_id: TenantId,
        rules: WeeklyRuleSettings,
    ) -> EngineResult<Tenant> {
        if !(1..=7).contains(&rules.absent_threshold) {
            return Err(EngineError::invalid_input(
                "weekly_absent_threshold",
                "must be between 1 and 7",
            ));
        }
        let (tenant, rebuilt) = self.store().write(|t| {
            let current = t.active_tenant(tenant_id)?;
            let penalty_changed = current.weekly_absent_penalty_enabled != rules.penalty_enabled
                || current.weekly_absent_threshold != rules.absent_threshold;
            // Stored summaries carry the penalty of the rules they were built under.
            let months: BTreeSet<(String, i32, u32)> = if penalty_changed {
                t.daily
                    .range((tenant_id, String::new(), NaiveDate::MIN)..)
                    .take_while(|((tenant, _, _), _)| *tenant == tenant_id)
                    .filter(|((_, employee_id, _), _)| t.employee_by_code(tenant_id, employee_id).is_ok())
                    .map(|((_, employee_id, date), _)| (employee_id.clone(), date.year(), date.month()))
                    .collect()
            } else {
                BTreeSet::new()
            };

            let tenant = t.active_tenant_mut(tenant_id)?;
            tenant.weekly_absent_penalty_enabled = rules.penalty_enabled;
            tenant.weekly_absent_threshold = rules.absent_threshold;
            tenant.sunday_bonus_enabled = rules.bonus_enabled;
            let tenant = tenant.clone();
            for (employee_id, year, month) in &months {
                refresh_month_aggregates(t, tenant_id, employee_id, *year, *month)?;
            }
            Ok((tenant, months.len()))
        })?;
        self.cache().invalidate(tenant_id, &ALL_SCOPES);
        info!(
            tenant_id = %tenant_id,
            penalty = rules.penalty_enabled,
            bonus = rules.bonus_enabled,
            threshold = rules.absent_threshold,
            rebuilt_months = rebuilt,
            "weekly rules updated"
        );
        Ok(tenant)
    }

    /// Adds usage credits. Returns the new balance.
    pub fn add_credits(&self, tenant_id: TenantId, amount: i64) -> EngineResult<i64> {
        if amount <= 0 {
            return Err(EngineError::invalid_input("amount", "must be positive"));
        }
        self.store().write(|t| {
            let tenant = t.active_tenant_mut(tenant_id)?;
            tenant.credits += amount;
            Ok(tenant.credits)
        })
    }

    /// Deducts usage credits under the store lock. Returns the new balance.
    ///
    /// # Errors
    ///
    /// [`EngineError::InsufficientCredits`] when the balance is too low;
    /// nothing is deducted.
    pub fn deduct_credits(&self, tenant_id: TenantId, amount: i64) -> EngineResult<i64> {
        if amount <= 0 {
            return Err(EngineError::invalid_input("amount", "must be positive"));
        }
        let balance = self.store().write(|t| {
            let tenant = t.active_tenant_mut(tenant_id)?;
            if tenant.credits < amount {
                return Err(EngineError::InsufficientCredits {
                    required: amount,
                    available: tenant.credits,
                });
            }
            tenant.credits -= amount;
            Ok(tenant.credits)
        })?;
        info!(tenant_id = %tenant_id, amount, balance, "credits deducted");
        Ok(balance)
    }

    /// Marks a tenant deleted. Its rows stay until purged.
    pub fn soft_delete_tenant(&self, tenant_id: TenantId, now: DateTime<Utc>) -> EngineResult<()> {
        self.store().write(|t| {
            let tenant = t.active_tenant_mut(tenant_id)?;
            tenant.deleted_at = Some(now);
            tenant.is_active = false;
            Ok(())
        })?;
        self.cache().invalidate(tenant_id, &ALL_SCOPES);
        info!(tenant_id = %tenant_id, "tenant soft-deleted");
        Ok(())
    }

    /// Restores a soft-deleted tenant within the recovery window.
    ///
    /// # Errors
    ///
    /// [`EngineError::RecoveryWindowExpired`] once the window has passed.
    pub fn recover_tenant(&self, tenant_id: TenantId, now: DateTime<Utc>) -> EngineResult<Tenant> {
        let window = self.config().tenancy.recovery_window_days;
        let tenant = self.store().write(|t| {
            let tenant = t
                .tenants
                .get_mut(&tenant_id)
                .filter(|t| t.is_deleted())
                .ok_or(EngineError::TenantNotFound { tenant_id })?;
            if !tenant.is_recoverable(now, window) {
                return Err(EngineError::RecoveryWindowExpired { tenant_id });
            }
            tenant.deleted_at = None;
            tenant.is_active = true;
            Ok(tenant.clone())
        })?;
        info!(tenant_id = %tenant_id, "tenant recovered");
        Ok(tenant)
    }

    /// Removes a tenant and every row it owns.
    pub fn purge_tenant(&self, tenant_id: TenantId) -> EngineResult<()> {
        self.store().write(|t| {
            if !t.tenants.contains_key(&tenant_id) {
                return Err(EngineError::TenantNotFound { tenant_id });
            }
            t.remove_tenant_rows(tenant_id);
            Ok(())
        })?;
        self.cache().invalidate(tenant_id, &ALL_SCOPES);
        warn!(tenant_id = %tenant_id, "tenant purged");
        Ok(())
    }

    /// Purges every soft-deleted tenant past its recovery window.
    pub fn purge_expired_tenants(&self, now: DateTime<Utc>) -> EngineResult<Vec<TenantId>> {
        let window = self.config().tenancy.recovery_window_days;
        let expired: Vec<TenantId> = self.store().read(|t| {
            t.tenants
                .values()
                .filter(|tenant| tenant.is_deleted() && !tenant.is_recoverable(now, window))
                .map(|tenant| tenant.id)
                .collect()
        })?;
        for tenant_id in &expired {
            self.purge_tenant(*tenant_id)?;
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::models::{AttendanceStatus, DailyAttendanceRecord, WeeklyRuleSettings};
    use crate::services::{AttendanceQuery, NewEmployee, PayrollEngine, TimePeriod};
    use chrono::{Duration, NaiveDate, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn test_credit_deduction_rejects_overdraw() {
        let engine = PayrollEngine::new(EngineConfig::default());
        let tenant = engine.create_tenant("Acme").unwrap();
        engine.add_credits(tenant.id, 10).unwrap();

        assert_eq!(engine.deduct_credits(tenant.id, 4).unwrap(), 6);
        let err = engine.deduct_credits(tenant.id, 7).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(engine.tenant(tenant.id).unwrap().credits, 6);
    }

    #[test]
    fn test_concurrent_deductions_never_overdraw() {
        let engine = PayrollEngine::new(EngineConfig::default());
        let tenant = engine.create_tenant("Acme").unwrap();
        engine.add_credits(tenant.id, 50).unwrap();

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.deduct_credits(tenant.id, 1).is_ok())
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(succeeded, 50);
        assert_eq!(engine.tenant(tenant.id).unwrap().credits, 0);
    }

    #[test]
    fn test_soft_delete_and_recover() {
        let engine = PayrollEngine::new(EngineConfig::default());
        let tenant = engine.create_tenant("Acme").unwrap();
        let now = Utc::now();

        engine.soft_delete_tenant(tenant.id, now).unwrap();
        assert!(engine.tenant(tenant.id).unwrap_err().is_not_found());

        let recovered = engine
            .recover_tenant(tenant.id, now + Duration::days(29))
            .unwrap();
        assert!(recovered.is_active);
    }

    #[test]
    fn test_recovery_window_expires() {
        let engine = PayrollEngine::new(EngineConfig::default());
        let tenant = engine.create_tenant("Acme").unwrap();
        let now = Utc::now();
        engine.soft_delete_tenant(tenant.id, now).unwrap();

        let err = engine
            .recover_tenant(tenant.id, now + Duration::days(31))
            .unwrap_err();
        assert!(err.is_locked());

        let purged = engine.purge_expired_tenants(now + Duration::days(31)).unwrap();
        assert_eq!(purged, vec![tenant.id]);
    }

    #[test]
    fn test_penalty_switch_rebuilds_stored_summaries() {
        let engine = PayrollEngine::new(EngineConfig::default());
        let tenant = engine.create_tenant("Acme").unwrap().id;
        let code = engine
            .create_employee(tenant, NewEmployee::new("Asha", "Rao", Decimal::from(25000)))
            .unwrap()
            .employee_id
            .unwrap();
        // 2025-06-02 is a Monday.
        for day in 2..=5 {
            let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
            engine
                .record_daily_attendance(
                    tenant,
                    DailyAttendanceRecord::new(tenant, &code, date, AttendanceStatus::Absent),
                )
                .unwrap();
        }
        let summary = engine.monthly_summary(tenant, &code, 2025, 6).unwrap().unwrap();
        assert_eq!(summary.weekly_penalty_days, Decimal::ZERO);

        let rules = WeeklyRuleSettings {
            penalty_enabled: true,
            absent_threshold: 4,
            bonus_enabled: false,
        };
        engine.update_weekly_rules(tenant, rules).unwrap();

        let summary = engine.monthly_summary(tenant, &code, 2025, 6).unwrap().unwrap();
        assert_eq!(summary.weekly_penalty_days, Decimal::ONE);
        let month = AttendanceQuery {
            time_period: TimePeriod::ThisMonth,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 15),
            ..AttendanceQuery::default()
        };
        let custom = AttendanceQuery {
            time_period: TimePeriod::Custom,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30),
            ..AttendanceQuery::default()
        };
        let by_month = engine.attendance_records(tenant, &month).unwrap();
        let by_range = engine.attendance_records(tenant, &custom).unwrap();
        assert_eq!(by_month.rows[0].weekly_penalty_days, Decimal::ONE);
        assert_eq!(by_range.rows[0].weekly_penalty_days, Decimal::ONE);

        engine.calculate_salary_for_period(tenant, 2025, 6, false);
        let salary = engine.salaries_for_period(tenant, 2025, 6).unwrap().remove(0);
        assert_eq!(salary.weekly_penalty_days, Decimal::ONE);

        engine
            .update_weekly_rules(tenant, WeeklyRuleSettings { penalty_enabled: false, ..rules })
            .unwrap();
        let summary = engine.monthly_summary(tenant, &code, 2025, 6).unwrap().unwrap();
        assert_eq!(summary.weekly_penalty_days, Decimal::ZERO);
    }

    #[test]
    fn test_blank_name_rejected() {
        let engine = PayrollEngine::new(EngineConfig::default());
        assert!(engine.create_tenant("  ").unwrap_err().is_validation());
    }
}
