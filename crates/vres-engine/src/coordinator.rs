//! Lifecycle coordination: admission, queueing, completion and cleanup.
//!
//! The coordinator is the only writer to the ledger, queue store and
//! registry. Each mutating step is a single non-suspending store operation;
//! suspension happens only at platform I/O, and any two callers racing
//! around such a boundary are reconciled through `JobRegistry::remove`
//! being the single source of truth for a job's end of life.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use vres_models::{
    estimated_processing_secs, CancelOutcome, JobId, Owner, OwnerKey, RejectReason, Submission,
    SubmitOutcome, TrackedJob, UserId, VariantSet,
};
use vres_platform::{DeliveryError, LimitPolicy, ProcessingPlatform};

use crate::config::EngineConfig;
use crate::ledger::ConcurrencyLedger;
use crate::queue_store::QueueStore;
use crate::registry::JobRegistry;

/// Orchestrates the life of every submission from admission to cleanup.
pub struct Coordinator {
    config: EngineConfig,
    platform: Arc<dyn ProcessingPlatform>,
    limits: Arc<dyn LimitPolicy>,
    ledger: ConcurrencyLedger,
    queues: QueueStore,
    registry: JobRegistry,
    /// Users with at least one in-flight or queued video. Presentation
    /// state only; correctness never depends on it.
    active_users: Mutex<HashSet<UserId>>,
}

impl Coordinator {
    pub fn new(
        config: EngineConfig,
        platform: Arc<dyn ProcessingPlatform>,
        limits: Arc<dyn LimitPolicy>,
    ) -> Self {
        Self {
            config,
            platform,
            limits,
            ledger: ConcurrencyLedger::new(),
            queues: QueueStore::new(),
            registry: JobRegistry::new(),
            active_users: Mutex::new(HashSet::new()),
        }
    }

    /// Submit a video for processing.
    ///
    /// Admission order: global cap, then the owner's concurrency ceiling.
    /// Owners at their ceiling are queued FIFO; everything else is admitted
    /// immediately and tracked once the asset is staged and parked.
    pub async fn submit(&self, submission: Submission) -> SubmitOutcome {
        let owner = submission.owner;
        let key = owner.key();

        self.reconcile_active_flag(&owner);

        // Global cap on everything the engine is holding, admitted or queued.
        let combined = self.registry.len() + self.queues.total_pending();
        if combined >= self.config.max_tracked {
            info!(
                owner = %owner,
                combined = combined,
                "System at capacity, rejecting submission"
            );
            return SubmitOutcome::Rejected {
                reason: RejectReason::SystemBusy,
            };
        }

        // Claim a slot first, then check the ceiling: increment-then-test
        // keeps the admission decision atomic with the counter update.
        let limit = self.limits.limit_for(&owner);
        let active = self.ledger.increment(key);
        if active > limit {
            self.ledger.decrement(key);

            if self.queues.total_pending() >= self.config.queue_size_limit {
                warn!(owner = %owner, "Overflow queue full, rejecting submission");
                return SubmitOutcome::Rejected {
                    reason: RejectReason::QueueFull,
                };
            }

            let position = self.queues.enqueue(submission);
            info!(
                owner = %owner,
                limit = limit,
                position = position,
                "Owner at concurrency limit, queued"
            );
            return SubmitOutcome::Queued { position };
        }

        if let Some(user) = owner.user_id() {
            self.active_users.lock().insert(user);
        }

        self.admit(submission).await
    }

    /// Stage, park and track an already-admitted submission.
    ///
    /// The caller has incremented the ledger; every failure path here rolls
    /// that back and frees the slot for the next queued entry.
    async fn admit(&self, submission: Submission) -> SubmitOutcome {
        let owner = submission.owner;

        let staged = match self.platform.relocate(&submission).await {
            Ok(staged) => staged,
            Err(e) => {
                warn!(owner = %owner, error = %e, "Relocation failed, rolling back admission");
                self.notify_user(&owner, COULD_NOT_START_NOTICE).await;
                self.release_slot(&owner).await;
                return SubmitOutcome::Rejected {
                    reason: RejectReason::RelocationFailed,
                };
            }
        };

        let job_id = staged.job_id;

        // The external system occasionally finishes before we ever park the
        // asset. Deliver straight away; nothing to track.
        if let Some(variants) = staged.ready {
            info!(job_id = %job_id, owner = %owner, "Variants already present at relocation, delivering");
            if let Err(e) = self.deliver(&owner, &variants).await {
                warn!(job_id = %job_id, owner = %owner, error = %e, "Immediate delivery failed");
            } else {
                self.platform
                    .report_operator(&format!(
                        "Video instantly processed\njob {} from {}\n{}",
                        job_id,
                        owner,
                        summarize(&submission, variants.len()),
                    ))
                    .await;
            }
            self.release_slot(&owner).await;
            return SubmitOutcome::AlreadyReady { job_id };
        }

        let parked = match self.platform.park_for_processing(job_id).await {
            Ok(parked) => parked,
            Err(e) => {
                warn!(
                    job_id = %job_id,
                    owner = %owner,
                    error = %e,
                    "Parking failed, rolling back admission; staged asset is orphaned"
                );
                self.notify_user(&owner, COULD_NOT_START_NOTICE).await;
                self.release_slot(&owner).await;
                return SubmitOutcome::Rejected {
                    reason: RejectReason::SchedulingFailed,
                };
            }
        };

        let job = TrackedJob::new(
            job_id,
            owner,
            parked,
            submission.size,
            submission.duration_secs,
        );
        self.registry.track(job);

        let estimate_secs = estimated_processing_secs(
            submission.duration_secs,
            submission.height,
            self.config.estimate_k,
        );
        self.notify_user(&owner, &processing_notice(estimate_secs)).await;

        info!(
            job_id = %job_id,
            owner = %owner,
            parked = %parked,
            estimate_secs = estimate_secs,
            "Video admitted and parked for processing"
        );
        SubmitOutcome::Accepted { job_id }
    }

    /// Cancel the owner's oldest in-flight job.
    pub async fn cancel(&self, owner: &Owner) -> CancelOutcome {
        let key = owner.key();
        let Some(job_id) = self.registry.lookup_by_owner(key) else {
            debug!(owner = %owner, "Nothing in flight to cancel");
            return CancelOutcome::NothingToCancel;
        };

        info!(job_id = %job_id, owner = %owner, "Cancelling in-flight job");
        if self.cleanup(job_id).await {
            CancelOutcome::Cancelled { job_id }
        } else {
            // Lost the race to the poller between lookup and remove.
            CancelOutcome::NothingToCancel
        }
    }

    /// End a job's life: cancel the parked artifact, release the slot and
    /// pull the owner's next queued submission.
    ///
    /// Safe to call from any path and any number of times; only the caller
    /// that actually removes the job from the registry performs the
    /// follow-up effects. Returns whether this call did.
    pub async fn cleanup(&self, job_id: JobId) -> bool {
        match self.registry.remove(job_id) {
            Some(job) => {
                self.finalize(job).await;
                true
            }
            None => {
                debug!(job_id = %job_id, "Cleanup raced, job already removed");
                false
            }
        }
    }

    /// Completion handler, invoked by the poller on a positive probe.
    ///
    /// Delivery failures are logged and never keep the job alive; a missing
    /// registry entry means the probe raced a cancellation and the result is
    /// silently discarded.
    pub async fn handle_completed(&self, job_id: JobId, variants: VariantSet) {
        let Some(job) = self.registry.remove(job_id) else {
            debug!(job_id = %job_id, "Completion raced, discarding probe result");
            return;
        };

        let elapsed_secs = job.age_secs(chrono::Utc::now());
        match self.deliver(&job.owner, &variants).await {
            Ok(()) => {
                info!(
                    job_id = %job_id,
                    owner = %job.owner,
                    elapsed_secs = elapsed_secs,
                    variants = variants.len(),
                    "Delivered processed video"
                );
                self.platform
                    .report_operator(&format!(
                        "Video processed\njob {} from {}\nsize {}\nduration {}s\nelapsed {}s\nvariants {}",
                        job_id,
                        job.owner,
                        human_size(job.original_size),
                        job.duration_secs,
                        elapsed_secs,
                        variants.len(),
                    ))
                    .await;
            }
            Err(e) => {
                warn!(job_id = %job_id, owner = %job.owner, error = %e, "Delivery failed");
                self.platform
                    .report_operator(&format!("Delivery failed for job {}: {}", job_id, e))
                    .await;
            }
        }

        self.finalize(job).await;
    }

    /// Timeout handler, invoked by the poller when a job outlives the
    /// processing threshold. Users get a notice; channel jobs are log-only.
    pub async fn handle_timeout(&self, job: &TrackedJob, elapsed_secs: u64) {
        warn!(
            job_id = %job.id,
            owner = %job.owner,
            elapsed_secs = elapsed_secs,
            "Job exceeded processing timeout"
        );

        self.notify_user(&job.owner, &timeout_notice(elapsed_secs)).await;
        self.platform
            .report_operator(&format!(
                "Processing timed out for job {} from {} after {}s",
                job.id, job.owner, elapsed_secs
            ))
            .await;

        self.cleanup(job.id).await;
    }

    /// Tear down: cancel every parked artifact and drop all state.
    pub async fn shutdown(&self) {
        let jobs = self.registry.snapshot();
        info!(in_flight = jobs.len(), "Shutting down, cancelling in-flight jobs");

        for job in jobs {
            if let Err(e) = self.platform.cancel_parked(job.parked).await {
                warn!(job_id = %job.id, parked = %job.parked, error = %e, "Cancel of parked artifact failed");
            }
            self.registry.remove(job.id);
            self.ledger.decrement(job.owner.key());
        }

        let dropped = self.queues.clear();
        if dropped > 0 {
            info!(dropped = dropped, "Dropped pending queue entries");
        }
        self.ledger.clear();
        self.active_users.lock().clear();
    }

    // ---- accessors ----

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn platform(&self) -> Arc<dyn ProcessingPlatform> {
        Arc::clone(&self.platform)
    }

    /// Snapshot of all in-flight jobs, for the poller's sweep.
    pub fn snapshot(&self) -> Vec<TrackedJob> {
        self.registry.snapshot()
    }

    /// In-flight count for one owner.
    pub fn in_flight(&self, owner: OwnerKey) -> u32 {
        self.ledger.count(owner)
    }

    /// In-flight jobs across all owners.
    pub fn tracked(&self) -> usize {
        self.registry.len()
    }

    /// Pending queue entries across all owners.
    pub fn pending(&self) -> usize {
        self.queues.total_pending()
    }

    /// Pending queue depth for one owner.
    pub fn queue_depth(&self, owner: OwnerKey) -> usize {
        self.queues.depth(owner)
    }

    /// Whether the user currently has in-flight or queued videos.
    pub fn is_active_user(&self, user: UserId) -> bool {
        self.active_users.lock().contains(&user)
    }

    // ---- internals ----

    /// Post-removal steps shared by completion, timeout and cancellation.
    /// Every step runs even when an earlier one fails.
    async fn finalize(&self, job: TrackedJob) {
        if let Err(e) = self.platform.cancel_parked(job.parked).await {
            warn!(job_id = %job.id, parked = %job.parked, error = %e, "Cancel of parked artifact failed");
        }
        self.release_slot(&job.owner).await;
    }

    /// Decrement the owner's counter, update the active set and hand the
    /// freed slot to the owner's next queued submission.
    async fn release_slot(&self, owner: &Owner) {
        let key = owner.key();
        let remaining = self.ledger.decrement(key);

        if let Some(user) = owner.user_id() {
            if remaining == 0 && !self.queues.has_pending(key) {
                self.active_users.lock().remove(&user);
                debug!(owner = %owner, "Owner no longer active");
            }
        }

        self.drain_next(key).await;
    }

    /// Resubmit the owner's oldest queued entry, if any.
    ///
    /// A failed resubmission is not re-enqueued: the entry is gone and the
    /// next one waits for the next freed slot.
    async fn drain_next(&self, owner: OwnerKey) {
        let Some(next) = self.queues.dequeue_next(owner) else {
            return;
        };

        info!(owner = %owner, asset = %next.asset, "Resubmitting next queued video");
        match Box::pin(self.submit(next)).await {
            SubmitOutcome::Rejected { reason } => {
                warn!(owner = %owner, reason = %reason, "Queued resubmission failed, entry dropped");
            }
            outcome => {
                debug!(owner = %owner, outcome = ?outcome, "Queued resubmission handled");
            }
        }
    }

    /// Drop a stale active flag left behind by an earlier inconsistency.
    fn reconcile_active_flag(&self, owner: &Owner) {
        let Some(user) = owner.user_id() else { return };
        let key = owner.key();
        let mut active = self.active_users.lock();
        if active.contains(&user) && self.ledger.count(key) == 0 && !self.queues.has_pending(key) {
            warn!(owner = %owner, "Active flag with no in-flight or queued videos, discarding");
            active.remove(&user);
        }
    }

    async fn deliver(&self, owner: &Owner, variants: &VariantSet) -> Result<(), DeliveryError> {
        match owner {
            Owner::User { id } => self.platform.deliver_result(*id, variants).await,
            Owner::ChannelPost { channel, message } => {
                self.platform.replace_in_place(*channel, *message, variants).await
            }
        }
    }

    async fn notify_user(&self, owner: &Owner, text: &str) {
        if let Some(user) = owner.user_id() {
            self.platform.notify(user, text).await;
        }
    }
}

const COULD_NOT_START_NOTICE: &str =
    "Could not start processing for your video. Please try again later.";

fn processing_notice(estimate_secs: u64) -> String {
    format!(
        "Your video is processing. Estimated time: about {} min.",
        estimate_secs.div_ceil(60)
    )
}

fn timeout_notice(elapsed_secs: u64) -> String {
    format!(
        "Processing took longer than expected and was cancelled after {} min. Please try again.",
        elapsed_secs / 60
    )
}

fn human_size(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    format!("{:.1} MB", mb)
}

fn summarize(submission: &Submission, variants: usize) -> String {
    format!(
        "size {}\nduration {}s\nvariants {}",
        human_size(submission.size),
        submission.duration_secs,
        variants
    )
}
