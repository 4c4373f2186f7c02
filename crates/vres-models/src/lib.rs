//! Shared data models for the VideoRes coordination engine.
//!
//! This crate provides Serde-serializable types for:
//! - Owner identities (users and channel posts)
//! - In-flight job records and handles
//! - Submissions, queue entries and their outcomes
//! - Derived variants handed back by external processing

pub mod estimate;
pub mod job;
pub mod owner;
pub mod submission;
pub mod variant;

// Re-export common types
pub use estimate::{estimated_processing_secs, DEFAULT_ESTIMATE_K};
pub use job::{JobId, ParkedHandle, TrackedJob};
pub use owner::{ChannelId, MessageId, Owner, OwnerKey, UserId};
pub use submission::{AssetRef, CancelOutcome, RejectReason, Submission, SubmitOutcome};
pub use variant::{Variant, VariantSet};
