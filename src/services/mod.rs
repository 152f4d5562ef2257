//! Engine services.
//!
//! [`PayrollEngine`] owns the store, the tenant cache and the task queue,
//! and exposes every write and read operation. Tenant ids are explicit
//! parameters on every call.

mod advances;
mod attendance;
mod employees;
mod holidays;
mod payroll;
mod pipeline;
mod reporting;
mod tenants;

use std::sync::Arc;

use tracing::info;

pub use attendance::ImportReport;
pub use employees::{BulkIdReport, NewEmployee};
pub use holidays::NewHoliday;
pub use payroll::{CalculationStatus, CalculationSummary, EligibleEmployee};
pub use reporting::{
    AttendanceQuery, AttendanceRecordRow, AttendanceReport, ChartQuery, ChartReport,
    DepartmentChartPoint, MonthlyChartPoint, TimePeriod,
};

use crate::cache::{CacheBackend, InMemoryCache, NoopCache, TenantCache};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::store::Store;
use crate::tasks::{BackgroundTask, InlineTaskQueue, TaskExecutor, TaskQueue, TokioTaskQueue};

struct EngineInner {
    config: EngineConfig,
    store: Store,
    cache: TenantCache,
    tasks: Arc<dyn TaskQueue>,
    detached: Option<Arc<TokioTaskQueue>>,
}

/// The payroll engine. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PayrollEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for PayrollEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayrollEngine")
            .field("config", &self.inner.config.name)
            .finish_non_exhaustive()
    }
}

impl PayrollEngine {
    /// Creates an engine with an in-memory cache (or none when caching is
    /// disabled).
    ///
    /// Background tasks run detached on the current tokio runtime when
    /// there is one, and inline on the calling thread otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::EngineConfig;
    /// use payroll_engine::services::PayrollEngine;
    ///
    /// let engine = PayrollEngine::new(EngineConfig::default());
    /// let tenant = engine.create_tenant("Acme Textiles").unwrap();
    /// assert_eq!(engine.tenant(tenant.id).unwrap().name, "Acme Textiles");
    /// ```
    pub fn new(config: EngineConfig) -> Self {
        match TokioTaskQueue::current() {
            Some(queue) => Self::detached(config, Arc::new(queue)),
            None => Self::inline(config),
        }
    }

    /// Creates an engine that runs background tasks on the calling thread.
    pub fn inline(config: EngineConfig) -> Self {
        let backend = default_backend(&config);
        Self::build(config, backend, Arc::new(InlineTaskQueue), None)
    }

    /// Creates an engine that spawns background tasks onto `queue`.
    pub fn detached(config: EngineConfig, queue: Arc<TokioTaskQueue>) -> Self {
        let backend = default_backend(&config);
        let tasks: Arc<dyn TaskQueue> = queue.clone();
        Self::build(config, backend, tasks, Some(queue))
    }

    fn build(
        config: EngineConfig,
        cache_backend: Arc<dyn CacheBackend>,
        tasks: Arc<dyn TaskQueue>,
        detached: Option<Arc<TokioTaskQueue>>,
    ) -> Self {
        info!(
            config = %config.name,
            cache_enabled = config.cache.enabled,
            detached_tasks = detached.is_some(),
            "payroll engine initialised"
        );
        let cache = TenantCache::new(cache_backend, config.cache.clone());
        Self {
            inner: Arc::new(EngineInner {
                config,
                store: Store::new(),
                cache,
                tasks,
                detached,
            }),
        }
    }

    /// Returns true if background tasks run off the calling thread.
    pub fn runs_tasks_detached(&self) -> bool {
        self.inner.detached.is_some()
    }

    /// Waits for detached background tasks submitted so far. Returns how
    /// many succeeded; always 0 for inline engines.
    pub async fn wait_for_background_tasks(&self) -> usize {
        match &self.inner.detached {
            Some(queue) => queue.wait_idle().await,
            None => 0,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// The row store.
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// The tenant cache.
    pub fn cache(&self) -> &TenantCache {
        &self.inner.cache
    }

    /// Hands `task` to the queue with its declared delivery.
    ///
    /// Must not be called while holding a store lock.
    pub(crate) fn submit(&self, task: BackgroundTask) {
        let delivery = task.delivery(&self.inner.config.tasks);
        let executor: Arc<dyn TaskExecutor> = Arc::new(self.clone());
        self.inner.tasks.submit(task, delivery, executor);
    }
}

fn default_backend(config: &EngineConfig) -> Arc<dyn CacheBackend> {
    if config.cache.enabled {
        Arc::new(InMemoryCache::new())
    } else {
        Arc::new(NoopCache)
    }
}

impl TaskExecutor for PayrollEngine {
    fn execute(&self, task: &BackgroundTask) -> EngineResult<()> {
        match task {
            BackgroundTask::SundayBonusCheck {
                tenant_id,
                employee_id,
                date,
            } => self
                .apply_weekly_bonus(*tenant_id, employee_id, *date)
                .map(|_| ()),
            BackgroundTask::ChartResync {
                tenant_id,
                year,
                month,
            } => self.resync_charts(*tenant_id, *year, *month).map(|_| ()),
        }
    }
}
