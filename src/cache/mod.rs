//! Tenant-partitioned read caches.
//!
//! Cached values are a performance aid only: every read path works with
//! caching disabled. Keys carry a per-(tenant, scope) version, so
//! invalidating a scope orphans every parameter variant at once. Prefix
//! deletion is attempted as well to reclaim space, and backends that do not
//! support it are left to expire the orphans by TTL.

mod memory;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub use memory::{InMemoryCache, NoopCache};

use crate::config::CacheConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::TenantId;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend does not implement the operation.
    #[error("Cache operation not supported: {operation}")]
    Unsupported {
        /// The operation attempted.
        operation: &'static str,
    },
    /// The backend failed.
    #[error("Cache backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl From<CacheError> for EngineError {
    fn from(error: CacheError) -> Self {
        EngineError::Cache {
            message: error.to_string(),
        }
    }
}

/// A string key-value cache with expiry.
pub trait CacheBackend: Send + Sync {
    /// Returns the live value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removes `key`.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Removes every key starting with `prefix`, returning how many went.
    ///
    /// Backends without pattern deletion return [`CacheError::Unsupported`].
    fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
}

/// Families of cached reads, invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// Attendance record listings.
    AttendanceRecords,
    /// Chart rollups.
    Charts,
    /// Eligible employees of a payroll period.
    EligibleEmployees,
}

impl CacheScope {
    /// Every scope an attendance write can make stale.
    pub const ATTENDANCE_WRITE: [CacheScope; 3] = [
        CacheScope::AttendanceRecords,
        CacheScope::Charts,
        CacheScope::EligibleEmployees,
    ];

    fn as_str(self) -> &'static str {
        match self {
            CacheScope::AttendanceRecords => "attendance_records",
            CacheScope::Charts => "charts",
            CacheScope::EligibleEmployees => "eligible_employees",
        }
    }
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Versioned, tenant-partitioned cache over a [`CacheBackend`].
pub struct TenantCache {
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
    versions: RwLock<HashMap<(TenantId, CacheScope), u64>>,
}

impl fmt::Debug for TenantCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TenantCache {
    /// Wraps `backend`.
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            backend,
            config,
            versions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns true when reads go through the cache.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn ttl(&self, scope: CacheScope) -> Duration {
        match scope {
            CacheScope::Charts => Duration::from_secs(self.config.chart_ttl_seconds),
            CacheScope::AttendanceRecords | CacheScope::EligibleEmployees => {
                Duration::from_secs(self.config.attendance_ttl_seconds)
            }
        }
    }

    /// The current version of a tenant scope.
    pub fn version(&self, tenant_id: TenantId, scope: CacheScope) -> u64 {
        self.versions
            .read()
            .map(|v| v.get(&(tenant_id, scope)).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn prefix(tenant_id: TenantId, scope: CacheScope) -> String {
        format!("{scope}:{tenant_id}:")
    }

    /// The full key of a parameter variant under the current version.
    pub fn key(&self, tenant_id: TenantId, scope: CacheScope, params: &str) -> String {
        format!(
            "{}v{}:{}",
            Self::prefix(tenant_id, scope),
            self.version(tenant_id, scope),
            params
        )
    }

    /// Returns the cached value for `params`, computing and storing it on
    /// a miss.
    ///
    /// Backend failures and undecodable entries are logged and treated as
    /// misses. Errors from `compute` are returned and nothing is stored.
    pub fn get_or_compute<T, F>(
        &self,
        tenant_id: TenantId,
        scope: CacheScope,
        params: &str,
        compute: F,
    ) -> EngineResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> EngineResult<T>,
    {
        if !self.config.enabled {
            return compute();
        }

        let key = self.key(tenant_id, scope, params);
        match self.backend.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(%key, "cache hit");
                    return Ok(value);
                }
                Err(err) => warn!(%key, error = %err, "discarding undecodable cache entry"),
            },
            Ok(None) => debug!(%key, "cache miss"),
            Err(err) => warn!(%key, error = %err, "cache read failed"),
        }

        let value = compute()?;
        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(err) = self.backend.set(&key, raw, self.ttl(scope)) {
                    warn!(%key, error = %err, "cache write failed");
                }
            }
            Err(err) => warn!(%key, error = %err, "cache value not serializable"),
        }
        Ok(value)
    }

    /// Invalidates every cached variant of `scopes` for a tenant.
    ///
    /// Never fails: the version bump alone makes the old entries
    /// unreachable.
    pub fn invalidate(&self, tenant_id: TenantId, scopes: &[CacheScope]) {
        for &scope in scopes {
            match self.versions.write() {
                Ok(mut versions) => {
                    *versions.entry((tenant_id, scope)).or_insert(0) += 1;
                }
                Err(_) => warn!(tenant_id = %tenant_id, %scope, "cache version lock poisoned"),
            }

            if !self.config.enabled {
                continue;
            }
            match self.backend.delete_prefix(&Self::prefix(tenant_id, scope)) {
                Ok(removed) => debug!(tenant_id = %tenant_id, %scope, removed, "cache scope evicted"),
                Err(CacheError::Unsupported { .. }) => {
                    debug!(tenant_id = %tenant_id, %scope, "prefix eviction unsupported; relying on version bump")
                }
                Err(err) => warn!(tenant_id = %tenant_id, %scope, error = %err, "cache eviction failed"),
            }
        }
    }
}
