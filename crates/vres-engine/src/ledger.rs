//! Per-owner in-flight counters.
//!
//! Pure counting: no capacity policy lives here. The counter is in-memory
//! only and resets with the process.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::warn;

use vres_models::OwnerKey;

/// Counts in-flight jobs per owner.
///
/// All operations are O(1), non-suspending and never fail. Decrementing an
/// owner at zero is a no-op logged as an inconsistency.
#[derive(Debug, Default)]
pub struct ConcurrencyLedger {
    counts: Mutex<HashMap<OwnerKey, u32>>,
}

impl ConcurrencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one in-flight job for the owner; returns the new count.
    pub fn increment(&self, owner: OwnerKey) -> u32 {
        let mut counts = self.counts.lock();
        let count = counts.entry(owner).or_insert(0);
        *count += 1;
        *count
    }

    /// Remove one in-flight job for the owner; returns the new count.
    ///
    /// Clamped at zero: an underflow means a cleanup raced another writer
    /// and is benign.
    pub fn decrement(&self, owner: OwnerKey) -> u32 {
        let mut counts = self.counts.lock();
        match counts.get_mut(&owner) {
            Some(count) if *count > 1 => {
                *count -= 1;
                *count
            }
            Some(_) => {
                counts.remove(&owner);
                0
            }
            None => {
                warn!(owner = %owner, "Ledger decrement for owner at zero, ignoring");
                0
            }
        }
    }

    /// Current in-flight count for the owner (zero for unseen owners).
    pub fn count(&self, owner: OwnerKey) -> u32 {
        self.counts.lock().get(&owner).copied().unwrap_or(0)
    }

    /// Drop every counter. Shutdown only.
    pub fn clear(&self) {
        self.counts.lock().clear();
    }
}
