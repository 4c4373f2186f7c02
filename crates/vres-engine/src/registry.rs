//! The authoritative table of in-flight jobs.
//!
//! A job ID is present here if and only if the job is in flight. `remove`
//! is the single source of truth for ending a job's life: whichever caller
//! gets the record back owns the follow-up effects, and everyone else must
//! treat `None` as "somebody beat me to it".

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::warn;

use vres_models::{JobId, OwnerKey, ParkedHandle, TrackedJob};

#[derive(Debug, Default)]
struct Indexes {
    jobs: HashMap<JobId, TrackedJob>,
    by_parked: HashMap<ParkedHandle, JobId>,
    by_owner: HashMap<OwnerKey, Vec<JobId>>,
}

/// In-flight job registry with secondary indexes by parked handle and owner.
///
/// All indexes are mutated together under one lock so they never disagree.
#[derive(Debug, Default)]
pub struct JobRegistry {
    inner: Mutex<Indexes>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly admitted job.
    pub fn track(&self, job: TrackedJob) {
        let mut inner = self.inner.lock();
        if inner.jobs.contains_key(&job.id) {
            warn!(job_id = %job.id, "Tracking a job ID that is already tracked, replacing");
            Self::unlink(&mut inner, job.id);
        }
        inner.by_parked.insert(job.parked, job.id);
        inner
            .by_owner
            .entry(job.owner.key())
            .or_default()
            .push(job.id);
        inner.jobs.insert(job.id, job);
    }

    /// Delete a job and all its index entries, returning what was deleted.
    ///
    /// Returns `None` when the job is not tracked (already completed, timed
    /// out or cancelled by a racing caller).
    pub fn remove(&self, id: JobId) -> Option<TrackedJob> {
        let mut inner = self.inner.lock();
        Self::unlink(&mut inner, id)
    }

    /// Oldest in-flight job for the owner, if any.
    pub fn lookup_by_owner(&self, owner: OwnerKey) -> Option<JobId> {
        self.inner
            .lock()
            .by_owner
            .get(&owner)
            .and_then(|ids| ids.first().copied())
    }

    /// Resolve a parked handle back to its job.
    pub fn lookup_by_parked(&self, parked: ParkedHandle) -> Option<JobId> {
        self.inner.lock().by_parked.get(&parked).copied()
    }

    /// Clone the current set of in-flight jobs.
    ///
    /// The poller sweeps over this snapshot instead of holding the lock, so
    /// jobs may legitimately disappear between snapshot and action.
    pub fn snapshot(&self) -> Vec<TrackedJob> {
        self.inner.lock().jobs.values().cloned().collect()
    }

    /// Number of in-flight jobs.
    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().jobs.is_empty()
    }

    /// In-flight jobs for one owner.
    pub fn count_for(&self, owner: OwnerKey) -> usize {
        self.inner
            .lock()
            .by_owner
            .get(&owner)
            .map_or(0, Vec::len)
    }

    fn unlink(inner: &mut Indexes, id: JobId) -> Option<TrackedJob> {
        let job = inner.jobs.remove(&id)?;
        inner.by_parked.remove(&job.parked);

        let key = job.owner.key();
        if let Some(ids) = inner.by_owner.get_mut(&key) {
            ids.retain(|candidate| *candidate != id);
            if ids.is_empty() {
                inner.by_owner.remove(&key);
            }
        }
        Some(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vres_models::Owner;

    fn job(id: i64, owner: Owner, parked: i64) -> TrackedJob {
        TrackedJob::new(JobId(id), owner, ParkedHandle(parked), 1024, 60)
    }

    #[test]
    fn test_track_and_remove() {
        let registry = JobRegistry::new();
        registry.track(job(1, Owner::user(7), 100));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup_by_parked(ParkedHandle(100)), Some(JobId(1)));
        assert_eq!(registry.lookup_by_owner(OwnerKey::User(7)), Some(JobId(1)));

        let removed = registry.remove(JobId(1)).unwrap();
        assert_eq!(removed.parked, ParkedHandle(100));

        assert!(registry.is_empty());
        assert_eq!(registry.lookup_by_parked(ParkedHandle(100)), None);
        assert_eq!(registry.lookup_by_owner(OwnerKey::User(7)), None);
    }

    #[test]
    fn test_second_remove_returns_none() {
        let registry = JobRegistry::new();
        registry.track(job(1, Owner::user(7), 100));

        assert!(registry.remove(JobId(1)).is_some());
        assert!(registry.remove(JobId(1)).is_none());
    }

    #[test]
    fn test_lookup_by_owner_returns_oldest() {
        let registry = JobRegistry::new();
        let owner = Owner::user(7);
        registry.track(job(1, owner, 100));
        registry.track(job(2, owner, 101));

        assert_eq!(registry.lookup_by_owner(OwnerKey::User(7)), Some(JobId(1)));

        registry.remove(JobId(1));
        assert_eq!(registry.lookup_by_owner(OwnerKey::User(7)), Some(JobId(2)));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = JobRegistry::new();
        registry.track(job(1, Owner::channel_post(-5, 9), 100));

        let snapshot = registry.snapshot();
        registry.remove(JobId(1));

        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_count_for_owner() {
        let registry = JobRegistry::new();
        registry.track(job(1, Owner::user(7), 100));
        registry.track(job(2, Owner::user(7), 101));
        registry.track(job(3, Owner::user(8), 102));

        assert_eq!(registry.count_for(OwnerKey::User(7)), 2);
        assert_eq!(registry.count_for(OwnerKey::User(8)), 1);
        assert_eq!(registry.count_for(OwnerKey::User(9)), 0);
    }
}
