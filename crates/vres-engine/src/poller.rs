//! Background sweep for completion detection and timeout enforcement.
//!
//! The external system offers no completion callback, so the poller probes
//! each parked artifact on a fixed interval until variants appear or the
//! job times out. Within one job's check the timeout always wins: a job
//! past the threshold is never also completed in the same tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;

/// Counters for one sweep, mainly for tests and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Jobs still awaiting variants.
    pub pending: usize,
    /// Jobs whose variants were detected and handled this sweep.
    pub completed: usize,
    /// Jobs expired and cleaned up this sweep.
    pub timed_out: usize,
    /// Probes that failed transiently; retried next tick.
    pub probe_errors: usize,
}

/// Periodic completion poller.
pub struct CompletionPoller {
    coordinator: Arc<Coordinator>,
    poll_interval: Duration,
    timeout: Duration,
}

impl CompletionPoller {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        let poll_interval = coordinator.config().poll_interval;
        let timeout = coordinator.config().processing_timeout;
        Self {
            coordinator,
            poll_interval,
            timeout,
        }
    }

    /// Run the sweep loop indefinitely. Spawn as a background task.
    pub async fn run(&self) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            "Starting completion poller"
        );

        let mut ticker = interval(self.poll_interval);
        // The first tick of a tokio interval fires immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// Run a single sweep over a registry snapshot.
    ///
    /// The snapshot is detached: a job removed by a racing cancellation
    /// between snapshot and action simply turns the action into a no-op.
    pub async fn sweep_once(&self) -> SweepStats {
        let jobs = self.coordinator.snapshot();
        if jobs.is_empty() {
            return SweepStats::default();
        }

        debug!(count = jobs.len(), "Polling tracked jobs");
        let platform = self.coordinator.platform();
        let mut stats = SweepStats::default();
        let now = Utc::now();

        for job in jobs {
            // Timeout first; an expired job skips its completion probe.
            if job.is_expired(now, self.timeout) {
                stats.timed_out += 1;
                self.coordinator.handle_timeout(&job, job.age_secs(now)).await;
                continue;
            }

            match platform.probe_completion(job.parked).await {
                Ok(Some(variants)) => {
                    stats.completed += 1;
                    self.coordinator.handle_completed(job.id, variants).await;
                }
                Ok(None) => {
                    stats.pending += 1;
                }
                Err(e) => {
                    stats.probe_errors += 1;
                    warn!(
                        job_id = %job.id,
                        parked = %job.parked,
                        error = %e,
                        "Completion probe failed, retrying next tick"
                    );
                }
            }
        }

        if stats.completed > 0 || stats.timed_out > 0 {
            info!(
                completed = stats.completed,
                timed_out = stats.timed_out,
                pending = stats.pending,
                "Sweep complete"
            );
        }
        stats
    }
}
