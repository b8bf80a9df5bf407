//! Periodic reconciliation scheduler.
//!
//! Runs the worker on a fixed interval in a background thread and accepts
//! manual triggers through a broadcast channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;

use super::reconciler::ReconciliationWorker;

pub struct SweepScheduler {
    worker: Arc<ReconciliationWorker>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    completed: Arc<AtomicU64>,
}

impl SweepScheduler {
    pub fn new(worker: Arc<ReconciliationWorker>, interval: Duration) -> Self {
        Self {
            worker,
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start the sweep loop in a background thread.
    ///
    /// The first sweep runs immediately, then one per interval. A message
    /// on `trigger_rx` starts an extra sweep.
    pub fn start(&self, mut trigger_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let worker = Arc::clone(&self.worker);
        let shutdown = Arc::clone(&self.shutdown);
        let completed = Arc::clone(&self.completed);
        let interval = self.interval;

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to start sweep scheduler runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async {
                let mut interval_timer = tokio::time::interval(interval);
                interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

                loop {
                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    tokio::select! {
                        _ = interval_timer.tick() => {},
                        Ok(()) = trigger_rx.recv() => {
                            log::info!("Manual reconciliation triggered");
                        },
                    }

                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    let report = worker.run().await;
                    completed.fetch_add(1, Ordering::AcqRel);
                    if !report.errors.is_empty() {
                        log::error!(
                            "Reconciliation run {} had {} fatal error(s)",
                            report.run_id,
                            report.errors.len()
                        );
                    }
                }

                log::info!("Sweep scheduler stopped");
            });
        })
    }

    /// Signals the scheduler to stop after the current sweep.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Number of sweeps finished so far.
    pub fn completed_runs(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }
}
