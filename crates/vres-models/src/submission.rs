//! Submissions and the outcomes of submitting or cancelling them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{JobId, Owner};

/// Opaque reference to the submitted asset on the platform side.
///
/// The engine never inspects it; it is handed back to the platform when the
/// asset is relocated to the staging area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One submitted video, before admission.
///
/// This is also what sits in the per-owner overflow queue while the owner is
/// at their concurrency limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub owner: Owner,
    pub asset: AssetRef,
    /// File size in bytes.
    pub size: u64,
    /// Duration in seconds.
    pub duration_secs: u32,
    /// Frame height, used only for processing-time estimation.
    pub height: u32,
}

impl Submission {
    pub fn new(owner: Owner, asset: AssetRef, size: u64, duration_secs: u32, height: u32) -> Self {
        Self {
            owner,
            asset,
            size,
            duration_secs,
            height,
        }
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Combined in-flight plus pending count reached the global cap.
    SystemBusy,
    /// Total pending entries across all owners reached the queue cap.
    QueueFull,
    /// The asset could not be staged.
    RelocationFailed,
    /// Staging succeeded but processing could not be scheduled.
    SchedulingFailed,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::SystemBusy => "system busy",
            RejectReason::QueueFull => "queue full",
            RejectReason::RelocationFailed => "relocation failed",
            RejectReason::SchedulingFailed => "scheduling failed",
        };
        write!(f, "{}", s)
    }
}

/// Result of submitting a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SubmitOutcome {
    /// Admitted and now tracked as in flight.
    Accepted { job_id: JobId },
    /// The external system had already produced variants at relocation time;
    /// the result was delivered immediately and nothing is tracked.
    AlreadyReady { job_id: JobId },
    /// Owner is at their concurrency limit; queued at the given position
    /// (1-based) in their FIFO.
    Queued { position: usize },
    /// Not admitted and not queued.
    Rejected { reason: RejectReason },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Result of a cancellation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CancelOutcome {
    /// The owner's in-flight job was cancelled and cleaned up.
    Cancelled { job_id: JobId },
    /// The owner had nothing in flight; no state was touched.
    NothingToCancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = SubmitOutcome::Queued { position: 3 };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"queued\""));
        assert!(json.contains("\"position\":3"));
    }

    #[test]
    fn test_reject_reason_display() {
        assert_eq!(RejectReason::SystemBusy.to_string(), "system busy");
        assert_eq!(RejectReason::QueueFull.to_string(), "queue full");
    }
}
