//! periodic reconciliation.
//!
//! drives [`GrantLifecycleManager::reconcile`] on a fixed interval, independent
//! of request traffic. at most one sweep runs at a time: timer ticks and
//! on-demand sweeps share a single-slot guard, and a tick that finds a sweep
//! already running is skipped rather than queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use grantkeeper_types::ReconcileConfig;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ListError;
use crate::lifecycle::{GrantLifecycleManager, ReconcileReport};

/// timer-driven trigger for reconciliation sweeps.
///
/// owns no grant state. clones share the same guard and counters.
#[derive(Clone)]
pub struct ReconciliationScheduler {
    manager: Arc<GrantLifecycleManager>,
    interval: Duration,
    enabled: bool,
    /// held for the duration of every sweep.
    guard: Arc<Mutex<()>>,
    sweeps: Arc<AtomicU64>,
}

impl ReconciliationScheduler {
    /// create a scheduler sweeping every `interval`.
    ///
    /// a zero interval disables the background loop; [`Self::sweep_now`]
    /// still works.
    pub fn new(manager: Arc<GrantLifecycleManager>, interval: Duration) -> Self {
        Self {
            manager,
            interval,
            enabled: !interval.is_zero(),
            guard: Arc::new(Mutex::new(())),
            sweeps: Arc::new(AtomicU64::new(0)),
        }
    }

    /// create a scheduler from configuration.
    pub fn from_config(manager: Arc<GrantLifecycleManager>, config: &ReconcileConfig) -> Self {
        let mut scheduler = Self::new(manager, config.interval());
        scheduler.enabled &= config.enabled;
        scheduler
    }

    /// whether the background loop will run when spawned.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// sweep interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// number of sweeps finished so far, successful or not.
    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps.load(Ordering::SeqCst)
    }

    /// run a sweep now, waiting for any in-flight sweep to finish first.
    pub async fn sweep_now(&self) -> Result<ReconcileReport, ListError> {
        let _slot = self.guard.lock().await;
        self.run_sweep().await
    }

    /// run a sweep unless one is already in flight.
    ///
    /// returns `None` when the tick was skipped.
    async fn tick(&self) -> Option<Result<ReconcileReport, ListError>> {
        let Ok(_slot) = self.guard.try_lock() else {
            debug!("reconciliation sweep still running, skipping tick");
            return None;
        };
        Some(self.run_sweep().await)
    }

    async fn run_sweep(&self) -> Result<ReconcileReport, ListError> {
        let result = self.manager.reconcile().await;
        self.sweeps.fetch_add(1, Ordering::SeqCst);
        result
    }

    /// spawn the background reconciliation task.
    ///
    /// the first sweep runs immediately, then every `interval`. a failed sweep
    /// is logged and the loop waits for the next tick. the loop stops when
    /// [`SchedulerHandle::shutdown`] is called or the handle is dropped.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let sweeps = self.sweeps.clone();

        let task = tokio::spawn(async move {
            if !self.is_enabled() {
                debug!("grant reconciliation scheduler disabled");
                return;
            }

            info!(
                interval_ms = self.interval.as_millis() as u64,
                "starting grant reconciliation scheduler"
            );

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                // not raced against shutdown: an in-flight sweep always finishes
                match self.tick().await {
                    Some(Ok(report)) if report.failed > 0 => {
                        warn!(
                            revoked = report.revoked,
                            failed = report.failed,
                            "reconciliation sweep finished with failures"
                        );
                    }
                    Some(Ok(_)) | None => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "reconciliation sweep failed, retrying next tick");
                    }
                }
            }

            info!("grant reconciliation scheduler stopped");
        });

        SchedulerHandle {
            shutdown_tx,
            task,
            sweeps,
        }
    }
}

/// handle to a running scheduler.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    sweeps: Arc<AtomicU64>,
}

impl SchedulerHandle {
    /// number of sweeps finished so far, successful or not.
    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps.load(Ordering::SeqCst)
    }

    /// whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// stop issuing ticks, let any in-flight sweep finish, and wait for the
    /// task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "grant reconciliation scheduler task ended abnormally");
        }
    }
}
