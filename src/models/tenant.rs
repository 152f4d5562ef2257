//! Tenant model.
//!
//! A tenant owns every other row in the engine. Its settings drive the
//! weekly penalty/bonus rules and the OT-rate derivation for its employees.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TenantDefaults;

/// Identifier of a tenant.
pub type TenantId = Uuid;

/// A company using the payroll engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier for the tenant.
    pub id: TenantId,
    /// Display name.
    pub name: String,
    /// Unpaid break per shift, in hours.
    pub break_time: Decimal,
    /// Average number of days in a month used to derive OT rates.
    pub average_days_per_month: Decimal,
    /// Whether the weekly absence penalty applies.
    pub weekly_absent_penalty_enabled: bool,
    /// Absent days in one week that trigger a penalty day.
    pub weekly_absent_threshold: u32,
    /// Whether the Sunday bonus applies.
    pub sunday_bonus_enabled: bool,
    /// Remaining usage credits.
    pub credits: i64,
    /// Whether the tenant is active.
    pub is_active: bool,
    /// When the tenant was soft-deleted, if it was.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tenant {
    /// Creates an active tenant using the configured defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::TenantDefaults;
    /// use payroll_engine::models::Tenant;
    ///
    /// let tenant = Tenant::new("Acme Textiles", &TenantDefaults::default());
    /// assert_eq!(tenant.weekly_absent_threshold, 4);
    /// assert!(tenant.is_active);
    /// ```
    pub fn new(name: impl Into<String>, defaults: &TenantDefaults) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            break_time: defaults.break_time,
            average_days_per_month: defaults.average_days_per_month,
            weekly_absent_penalty_enabled: defaults.weekly_absent_penalty_enabled,
            weekly_absent_threshold: defaults.weekly_absent_threshold,
            sunday_bonus_enabled: defaults.sunday_bonus_enabled,
            credits: 0,
            is_active: true,
            deleted_at: None,
        }
    }

    /// Returns true if the tenant has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if a soft-deleted tenant can still be recovered at `now`.
    pub fn is_recoverable(&self, now: DateTime<Utc>, window_days: i64) -> bool {
        match self.deleted_at {
            Some(deleted_at) => now - deleted_at <= Duration::days(window_days),
            None => false,
        }
    }

    /// The weekly-rule settings of this tenant.
    pub fn weekly_rules(&self) -> WeeklyRuleSettings {
        WeeklyRuleSettings {
            penalty_enabled: self.weekly_absent_penalty_enabled,
            absent_threshold: self.weekly_absent_threshold,
            bonus_enabled: self.sunday_bonus_enabled,
        }
    }
}

/// Tenant-level switches for the weekly penalty and bonus rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRuleSettings {
    /// Whether the weekly absence penalty applies.
    pub penalty_enabled: bool,
    /// Absent days in one week that trigger a penalty day.
    pub absent_threshold: u32,
    /// Whether the Sunday bonus applies.
    pub bonus_enabled: bool,
}

impl Default for WeeklyRuleSettings {
    fn default() -> Self {
        Self {
            penalty_enabled: false,
            absent_threshold: 4,
            bonus_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tenant_uses_defaults() {
        let tenant = Tenant::new("Acme", &TenantDefaults::default());
        assert_eq!(tenant.break_time, Decimal::new(5, 1));
        assert_eq!(tenant.average_days_per_month, Decimal::new(304, 1));
        assert!(!tenant.is_deleted());
    }

    #[test]
    fn test_recovery_window() {
        let mut tenant = Tenant::new("Acme", &TenantDefaults::default());
        let deleted = Utc::now();
        tenant.deleted_at = Some(deleted);

        assert!(tenant.is_recoverable(deleted + Duration::days(30), 30));
        assert!(!tenant.is_recoverable(deleted + Duration::days(31), 30));
    }

    #[test]
    fn test_active_tenant_is_not_recoverable() {
        let tenant = Tenant::new("Acme", &TenantDefaults::default());
        assert!(!tenant.is_recoverable(Utc::now(), 30));
    }

    #[test]
    fn test_weekly_rules_reflect_settings() {
        let mut tenant = Tenant::new("Acme", &TenantDefaults::default());
        tenant.weekly_absent_penalty_enabled = true;
        tenant.weekly_absent_threshold = 3;

        let rules = tenant.weekly_rules();
        assert!(rules.penalty_enabled);
        assert_eq!(rules.absent_threshold, 3);
        assert!(!rules.bonus_enabled);
    }
}
