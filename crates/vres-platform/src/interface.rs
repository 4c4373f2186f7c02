//! The processing platform seam.
//!
//! The engine never talks to the messaging platform or the transcoder
//! directly; everything goes through [`ProcessingPlatform`]. The external
//! transcoding process is a black box: the platform can only relocate an
//! asset into staging, park it so processing begins, and later observe
//! whether derived variants appeared.

use async_trait::async_trait;

use vres_models::{ChannelId, JobId, MessageId, ParkedHandle, Submission, UserId, VariantSet};

use crate::error::{DeliveryError, PlatformError, ProbeError, RelocateError, ScheduleError};

/// Result of relocating an asset into the staging area.
#[derive(Debug, Clone)]
pub struct Staged {
    /// Staging-area ID; becomes the job's primary key.
    pub job_id: JobId,

    /// Variants that were already present at relocation time.
    ///
    /// The external system occasionally processes an asset before we ever
    /// park it; when that happens the result can be delivered immediately
    /// and nothing needs to be tracked.
    pub ready: Option<VariantSet>,
}

/// External collaborator used by the coordination engine.
#[async_trait]
pub trait ProcessingPlatform: Send + Sync {
    /// Move a submitted asset into the staging area.
    async fn relocate(&self, submission: &Submission) -> Result<Staged, RelocateError>;

    /// Ask the external system to begin processing a staged asset.
    ///
    /// Returns a durable handle used later for probing and cancellation.
    async fn park_for_processing(&self, job_id: JobId) -> Result<ParkedHandle, ScheduleError>;

    /// Non-blocking check for derived variants on a parked artifact.
    ///
    /// `Ok(None)` is the expected steady-state answer while processing is
    /// still underway.
    async fn probe_completion(&self, parked: ParkedHandle) -> Result<Option<VariantSet>, ProbeError>;

    /// Best-effort cancellation of a parked artifact.
    async fn cancel_parked(&self, parked: ParkedHandle) -> Result<(), PlatformError>;

    /// Deliver variants directly to a user.
    async fn deliver_result(&self, user: UserId, variants: &VariantSet) -> Result<(), DeliveryError>;

    /// Replace a channel post in place with its processed variants.
    async fn replace_in_place(
        &self,
        channel: ChannelId,
        message: MessageId,
        variants: &VariantSet,
    ) -> Result<(), DeliveryError>;

    /// Fire-and-forget user notification (timeouts, errors).
    async fn notify(&self, user: UserId, text: &str);

    /// Fire-and-forget report to the operator/admin channel.
    async fn report_operator(&self, text: &str);
}
