//! In-memory state cache
//!
//! Holds the most recently processed snapshot for each identity. The cache is
//! owned by a single [`Tracker`](crate::Tracker), so it carries no locking.

use crate::snapshot::{Identity, Snapshot};
use std::collections::HashMap;

/// Mapping from Pod identity to its last observed snapshot
#[derive(Debug, Default, Clone)]
pub struct StateCache {
    entries: HashMap<Identity, Snapshot>,
}

impl StateCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot for `identity`, if any.
    pub fn get(&self, identity: &Identity) -> Option<&Snapshot> {
        self.entries.get(identity)
    }

    /// Stores `snapshot` under its identity, replacing any previous entry.
    ///
    /// Returns the replaced snapshot.
    pub fn put(&mut self, snapshot: Snapshot) -> Option<Snapshot> {
        self.entries.insert(snapshot.identity.clone(), snapshot)
    }

    /// Removes the entry for `identity`. Absent identities are a no-op.
    pub fn remove(&mut self, identity: &Identity) -> Option<Snapshot> {
        self.entries.remove(identity)
    }

    /// True when `identity` has a cached snapshot.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Number of cached snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Cached identities in sorted order.
    pub fn identities(&self) -> Vec<Identity> {
        let mut identities: Vec<Identity> = self.entries.keys().cloned().collect();
        identities.sort();
        identities
    }
}
