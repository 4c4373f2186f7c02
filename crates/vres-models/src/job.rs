//! In-flight job records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::Owner;

/// Primary key of an in-flight job.
///
/// Assigned when the asset lands in the staging area; identifies the job for
/// the rest of its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl JobId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the parked artifact awaiting external processing.
///
/// Used for probing and best-effort cancellation; maps back to exactly one
/// job while that job is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParkedHandle(pub i64);

impl ParkedHandle {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ParkedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of an in-flight job.
///
/// A job is tracked from admission until completion, timeout or cancellation;
/// it is never mutated in place, only removed whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedJob {
    /// Staging-area ID, the primary key.
    pub id: JobId,

    /// Who submitted the video.
    pub owner: Owner,

    /// Parked artifact awaiting processing.
    pub parked: ParkedHandle,

    /// Admission timestamp, used for timeout detection.
    pub submitted_at: DateTime<Utc>,

    /// Original file size in bytes (reporting only).
    pub original_size: u64,

    /// Video duration in seconds (reporting only).
    pub duration_secs: u32,
}

impl TrackedJob {
    pub fn new(id: JobId, owner: Owner, parked: ParkedHandle, original_size: u64, duration_secs: u32) -> Self {
        Self {
            id,
            owner,
            parked,
            submitted_at: Utc::now(),
            original_size,
            duration_secs,
        }
    }

    /// Seconds elapsed since admission, clamped at zero.
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.submitted_at).num_seconds().max(0) as u64
    }

    /// Whether the job exceeded the processing timeout at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let age_ms = (now - self.submitted_at).num_milliseconds().max(0) as u128;
        age_ms > timeout.as_millis()
    }
}
