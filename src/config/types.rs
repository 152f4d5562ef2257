//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `engine.yaml`.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Defaults applied to newly created tenants and payroll periods.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TenantDefaults {
    /// Unpaid break per shift, in hours.
    pub break_time: Decimal,
    /// Average number of days in a month used to derive OT rates.
    pub average_days_per_month: Decimal,
    /// Absent days in one week that trigger a weekly penalty day.
    pub weekly_absent_threshold: u32,
    /// Whether the weekly absence penalty is applied.
    pub weekly_absent_penalty_enabled: bool,
    /// Whether the Sunday bonus is applied.
    pub sunday_bonus_enabled: bool,
    /// Default TDS percentage for new payroll periods.
    pub tds_rate: Decimal,
}

impl Default for TenantDefaults {
    fn default() -> Self {
        Self {
            break_time: Decimal::new(5, 1),
            average_days_per_month: Decimal::new(304, 1),
            weekly_absent_threshold: 4,
            weekly_absent_penalty_enabled: false,
            sunday_bonus_enabled: false,
            tds_rate: Decimal::ZERO,
        }
    }
}

/// Cache behaviour for the reporting read paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// When false every read is computed from the store.
    pub enabled: bool,
    /// TTL for attendance-record and eligible-employee entries.
    pub attendance_ttl_seconds: u64,
    /// TTL for chart entries.
    pub chart_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            attendance_ttl_seconds: 300,
            chart_ttl_seconds: 600,
        }
    }
}

/// Background task settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskConfig {
    /// Upper bound on attempts for at-least-once chart resync tasks.
    pub chart_resync_max_attempts: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            chart_resync_max_attempts: 3,
        }
    }
}

/// Tenant lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TenancyConfig {
    /// Days after a soft delete during which a tenant can be recovered.
    pub recovery_window_days: i64,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            recovery_window_days: 30,
        }
    }
}

/// The complete engine configuration.
///
/// [`EngineConfig::default`] matches `config/default/engine.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// A label for the configuration set.
    pub name: String,
    /// Defaults for tenants and periods.
    #[serde(default)]
    pub tenant_defaults: TenantDefaults,
    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Background task settings.
    #[serde(default)]
    pub tasks: TaskConfig,
    /// Tenant lifecycle settings.
    #[serde(default)]
    pub tenancy: TenancyConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            tenant_defaults: TenantDefaults::default(),
            cache: CacheConfig::default(),
            tasks: TaskConfig::default(),
            tenancy: TenancyConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Returns a copy of this configuration with caching switched off.
    pub fn without_cache(mut self) -> Self {
        self.cache.enabled = false;
        self
    }
}
