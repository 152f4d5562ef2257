//! Background work detached from the request that triggered it.
//!
//! Two units exist: the weekly bonus check after an attendance write, and
//! the chart resync after a salary batch. Each declares its delivery: the
//! bonus check runs once on a best-effort basis, the resync is retried up to
//! a configured number of attempts. Failures are logged, never surfaced.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::TaskConfig;
use crate::error::EngineResult;
use crate::models::TenantId;

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "task")]
pub enum BackgroundTask {
    /// Re-evaluate the weekly bonus for the week containing `date`.
    SundayBonusCheck {
        /// Tenant.
        tenant_id: TenantId,
        /// Employee code.
        employee_id: String,
        /// The written attendance date.
        date: NaiveDate,
    },
    /// Rebuild every chart row of a tenant-month.
    ChartResync {
        /// Tenant.
        tenant_id: TenantId,
        /// Calendar year.
        year: i32,
        /// Calendar month.
        month: u32,
    },
}

impl BackgroundTask {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            BackgroundTask::SundayBonusCheck { .. } => "sunday_bonus_check",
            BackgroundTask::ChartResync { .. } => "chart_resync",
        }
    }

    /// The tenant the task works on.
    pub fn tenant_id(&self) -> TenantId {
        match self {
            BackgroundTask::SundayBonusCheck { tenant_id, .. }
            | BackgroundTask::ChartResync { tenant_id, .. } => *tenant_id,
        }
    }

    /// The delivery guarantee of this task under `config`.
    pub fn delivery(&self, config: &TaskConfig) -> Delivery {
        match self {
            BackgroundTask::SundayBonusCheck { .. } => Delivery::BestEffort,
            BackgroundTask::ChartResync { .. } => Delivery::AtLeastOnce {
                max_attempts: config.chart_resync_max_attempts.max(1),
            },
        }
    }
}

/// How hard a queue tries to run a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// One attempt; failure is logged and dropped.
    BestEffort,
    /// Retried until success or `max_attempts`.
    AtLeastOnce {
        /// Upper bound on attempts.
        max_attempts: u32,
    },
}

impl Delivery {
    /// Number of attempts allowed.
    pub fn max_attempts(self) -> u32 {
        match self {
            Delivery::BestEffort => 1,
            Delivery::AtLeastOnce { max_attempts } => max_attempts.max(1),
        }
    }
}

/// Runs background tasks.
pub trait TaskExecutor: Send + Sync {
    /// Executes `task` once.
    fn execute(&self, task: &BackgroundTask) -> EngineResult<()>;
}

/// Accepts tasks for execution outside the caller's flow.
pub trait TaskQueue: Send + Sync {
    /// Schedules `task` on `executor` with the given delivery.
    fn submit(&self, task: BackgroundTask, delivery: Delivery, executor: Arc<dyn TaskExecutor>);
}

/// Runs `task` honouring `delivery`. Returns true if an attempt succeeded.
pub fn run_with_delivery(
    executor: &dyn TaskExecutor,
    task: &BackgroundTask,
    delivery: Delivery,
) -> bool {
    let max_attempts = delivery.max_attempts();
    for attempt in 1..=max_attempts {
        match executor.execute(task) {
            Ok(()) => {
                debug!(task = task.name(), tenant_id = %task.tenant_id(), attempt, "background task completed");
                return true;
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    task = task.name(),
                    tenant_id = %task.tenant_id(),
                    attempt,
                    error = %err,
                    "background task failed; retrying"
                );
            }
            Err(err) => {
                error!(
                    task = task.name(),
                    tenant_id = %task.tenant_id(),
                    attempts = attempt,
                    error = %err,
                    "background task abandoned"
                );
            }
        }
    }
    false
}

/// Runs tasks immediately on the submitting thread.
///
/// Used in tests and synchronous contexts. The caller must not hold store
/// locks while submitting.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineTaskQueue;

impl TaskQueue for InlineTaskQueue {
    fn submit(&self, task: BackgroundTask, delivery: Delivery, executor: Arc<dyn TaskExecutor>) {
        run_with_delivery(executor.as_ref(), &task, delivery);
    }
}

/// Runs tasks on a tokio runtime's blocking pool.
#[derive(Debug)]
pub struct TokioTaskQueue {
    handle: Handle,
    pending: Mutex<Vec<JoinHandle<bool>>>,
}

impl TokioTaskQueue {
    /// Creates a queue spawning onto `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Creates a queue on the runtime of the calling task, if there is one.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Waits for every task submitted so far. Returns how many succeeded.
    pub async fn wait_idle(&self) -> usize {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return 0,
        };
        let mut succeeded = 0;
        for handle in handles {
            match handle.await {
                Ok(true) => succeeded += 1,
                Ok(false) => {}
                Err(err) => error!(error = %err, "background task panicked"),
            }
        }
        succeeded
    }
}

impl TaskQueue for TokioTaskQueue {
    fn submit(&self, task: BackgroundTask, delivery: Delivery, executor: Arc<dyn TaskExecutor>) {
        let handle = self
            .handle
            .spawn_blocking(move || run_with_delivery(executor.as_ref(), &task, delivery));
        match self.pending.lock() {
            Ok(mut pending) => {
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
            Err(_) => warn!("task tracking lock poisoned; task left untracked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    struct FailingExecutor {
        calls: AtomicU32,
        succeed_on: u32,
    }

    impl TaskExecutor for FailingExecutor {
        fn execute(&self, _task: &BackgroundTask) -> EngineResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.succeed_on {
                Ok(())
            } else {
                Err(EngineError::Storage {
                    message: "transient".into(),
                })
            }
        }
    }

    fn resync() -> BackgroundTask {
        BackgroundTask::ChartResync {
            tenant_id: Uuid::nil(),
            year: 2025,
            month: 6,
        }
    }

    #[test]
    fn test_delivery_per_task() {
        let config = TaskConfig {
            chart_resync_max_attempts: 5,
        };
        assert_eq!(resync().delivery(&config).max_attempts(), 5);
        let bonus = BackgroundTask::SundayBonusCheck {
            tenant_id: Uuid::nil(),
            employee_id: "ENG-ASH-001".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        };
        assert_eq!(bonus.delivery(&config), Delivery::BestEffort);
    }

    #[test]
    fn test_at_least_once_retries_until_success() {
        let executor = FailingExecutor {
            calls: AtomicU32::new(0),
            succeed_on: 3,
        };
        assert!(run_with_delivery(
            &executor,
            &resync(),
            Delivery::AtLeastOnce { max_attempts: 3 }
        ));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_best_effort_runs_once() {
        let executor = FailingExecutor {
            calls: AtomicU32::new(0),
            succeed_on: 2,
        };
        assert!(!run_with_delivery(&executor, &resync(), Delivery::BestEffort));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_tokio_queue_runs_detached() {
        let queue = TokioTaskQueue::current().unwrap();
        let executor = Arc::new(FailingExecutor {
            calls: AtomicU32::new(0),
            succeed_on: 1,
        });
        queue.submit(resync(), Delivery::BestEffort, executor.clone());
        queue.submit(resync(), Delivery::BestEffort, executor.clone());
        assert_eq!(queue.wait_idle().await, 2);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    }
}
