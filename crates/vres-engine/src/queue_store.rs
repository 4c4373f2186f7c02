//! Per-owner FIFO queues of submissions awaiting an admission slot.
//!
//! The store enforces nothing: both caps (global and combined) are checked
//! by the coordinator before anything is enqueued here. Cross-owner ordering
//! is unspecified; only per-owner FIFO order matters.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use vres_models::{OwnerKey, Submission};

/// Owner-scoped overflow queues.
#[derive(Debug, Default)]
pub struct QueueStore {
    queues: Mutex<HashMap<OwnerKey, VecDeque<Submission>>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submission to its owner's queue; returns the queue depth
    /// after insertion (the 1-based position of the new entry).
    pub fn enqueue(&self, submission: Submission) -> usize {
        let mut queues = self.queues.lock();
        let queue = queues.entry(submission.owner.key()).or_default();
        queue.push_back(submission);
        queue.len()
    }

    /// Pop the oldest pending submission for the owner, if any.
    pub fn dequeue_next(&self, owner: OwnerKey) -> Option<Submission> {
        let mut queues = self.queues.lock();
        let queue = queues.get_mut(&owner)?;
        let next = queue.pop_front();
        if queue.is_empty() {
            queues.remove(&owner);
        }
        next
    }

    /// Whether the owner has anything queued.
    pub fn has_pending(&self, owner: OwnerKey) -> bool {
        self.queues
            .lock()
            .get(&owner)
            .is_some_and(|q| !q.is_empty())
    }

    /// Queue depth for one owner.
    pub fn depth(&self, owner: OwnerKey) -> usize {
        self.queues.lock().get(&owner).map_or(0, VecDeque::len)
    }

    /// Pending entries across all owners.
    pub fn total_pending(&self) -> usize {
        self.queues.lock().values().map(VecDeque::len).sum()
    }

    /// Drop every pending entry; returns how many were dropped. Shutdown only.
    pub fn clear(&self) -> usize {
        let mut queues = self.queues.lock();
        let dropped = queues.values().map(VecDeque::len).sum();
        queues.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vres_models::{AssetRef, Owner};

    fn submission(owner: Owner, tag: &str) -> Submission {
        Submission::new(owner, AssetRef::new(tag), 1024, 60, 720)
    }

    #[test]
    fn test_fifo_per_owner() {
        let store = QueueStore::new();
        let owner = Owner::user(1);

        assert_eq!(store.enqueue(submission(owner, "a")), 1);
        assert_eq!(store.enqueue(submission(owner, "b")), 2);
        assert_eq!(store.enqueue(submission(owner, "c")), 3);

        let key = owner.key();
        assert_eq!(store.dequeue_next(key).unwrap().asset.as_str(), "a");
        assert_eq!(store.dequeue_next(key).unwrap().asset.as_str(), "b");
        assert_eq!(store.dequeue_next(key).unwrap().asset.as_str(), "c");
        assert!(store.dequeue_next(key).is_none());
    }

    #[test]
    fn test_owners_do_not_interleave() {
        let store = QueueStore::new();
        store.enqueue(submission(Owner::user(1), "u1"));
        store.enqueue(submission(Owner::channel_post(1, 5), "c1"));

        assert_eq!(store.depth(OwnerKey::User(1)), 1);
        assert_eq!(store.depth(OwnerKey::Channel(1)), 1);
        assert_eq!(store.total_pending(), 2);

        let got = store.dequeue_next(OwnerKey::User(1)).unwrap();
        assert_eq!(got.asset.as_str(), "u1");
        assert!(store.has_pending(OwnerKey::Channel(1)));
        assert!(!store.has_pending(OwnerKey::User(1)));
    }

    #[test]
    fn test_clear_reports_dropped() {
        let store = QueueStore::new();
        store.enqueue(submission(Owner::user(1), "a"));
        store.enqueue(submission(Owner::user(2), "b"));
        assert_eq!(store.clear(), 2);
        assert_eq!(store.total_pending(), 0);
    }
}
