//! Engine configuration.

use std::time::Duration;

use vres_models::DEFAULT_ESTIMATE_K;

/// Read-only inputs to the coordinator and poller.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cap on the combined in-flight plus pending count across the system.
    pub max_tracked: usize,
    /// Cap on pending queue entries across all owners.
    pub queue_size_limit: usize,
    /// Interval between completion-poll sweeps.
    pub poll_interval: Duration,
    /// How long a job may stay in flight before it is timed out.
    pub processing_timeout: Duration,
    /// Tuning constant for processing-time estimates.
    pub estimate_k: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tracked: 100,
            queue_size_limit: 1000,
            poll_interval: Duration::from_secs(30),
            processing_timeout: Duration::from_secs(3600),
            estimate_k: DEFAULT_ESTIMATE_K,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_tracked: std::env::var("VRES_MAX_TRACKED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            queue_size_limit: std::env::var("VRES_QUEUE_SIZE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
            poll_interval: Duration::from_secs(
                std::env::var("VRES_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            processing_timeout: Duration::from_secs(
                std::env::var("VRES_PROCESSING_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            estimate_k: std::env::var("VRES_ESTIMATE_K")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ESTIMATE_K),
        }
    }
}
