//! Event classification
//!
//! The [`Tracker`] owns a [`StateCache`] and turns each watch event into zero
//! or one [`Report`]. Whether an identity is Unseen or Known is read from the
//! cache; it is not stored separately.
//!
//! | event     | Unseen                         | Known                                  |
//! |-----------|--------------------------------|----------------------------------------|
//! | `created` | store, report `Created`        | overwrite, report `Created` (no diff)  |
//! | `updated` | store as baseline, no report   | diff, report `Changed` if any delta    |
//! | `removed` | no-op                          | evict, report `Removed` (last state)   |
//!
//! A full relist from the upstream watcher is bracketed by
//! [`Tracker::begin_resync`] and [`Tracker::finish_resync`]; identities that
//! were cached but not relisted are evicted when the resync finishes.

use crate::cache::StateCache;
use crate::diff::diff;
use crate::error::PodDiffError;
use crate::report::Report;
use crate::snapshot::{Identity, Snapshot};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Declared kind of a watch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Object was added
    Created,
    /// Object was modified
    Updated,
    /// Object was deleted
    Removed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::Removed => "removed",
        })
    }
}

/// A watch event whose payload has already been reduced to a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Declared event kind
    pub kind: EventKind,
    /// Tracked state carried by the event
    pub snapshot: Snapshot,
}

impl Event {
    /// Creates an event from an extracted snapshot.
    pub fn new(kind: EventKind, snapshot: Snapshot) -> Self {
        Self { kind, snapshot }
    }

    /// Builds an event from the JSON form of a Pod.
    pub fn from_payload(kind: EventKind, payload: &Value) -> Result<Self, PodDiffError> {
        Ok(Self::new(kind, Snapshot::from_value(payload)?))
    }
}

/// What happens to the cache when the upstream watcher relists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResyncPolicy {
    /// Keep the cache; relisted Pods are diffed against it and vanished
    /// Pods are reported as removed
    #[default]
    Reconcile,
    /// Forget everything; every relisted Pod is reported as created
    Clear,
}

impl fmt::Display for ResyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResyncPolicy::Reconcile => "reconcile",
            ResyncPolicy::Clear => "clear",
        })
    }
}

/// Per-scope state machine over watch events
#[derive(Debug, Default)]
pub struct Tracker {
    cache: StateCache,
    policy: ResyncPolicy,
    /// Identities observed since `begin_resync`, while a resync is open
    relisted: Option<HashSet<Identity>>,
}

impl Tracker {
    /// Creates a tracker with an empty cache and the default resync policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker with an empty cache and the given resync policy.
    pub fn with_policy(policy: ResyncPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Read-only view of the cached snapshots.
    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Resync policy this tracker was built with.
    pub fn policy(&self) -> ResyncPolicy {
        self.policy
    }

    /// True once a snapshot for `identity` is cached.
    pub fn is_known(&self, identity: &Identity) -> bool {
        self.cache.contains(identity)
    }

    /// True between `begin_resync` and `finish_resync`.
    pub fn is_resyncing(&self) -> bool {
        self.relisted.is_some()
    }

    /// Extracts a snapshot from `payload` and processes it.
    ///
    /// A malformed payload is returned as an error and leaves the cache
    /// untouched.
    pub fn handle(&mut self, kind: EventKind, payload: &Value) -> Result<Option<Report>, PodDiffError> {
        let event = Event::from_payload(kind, payload)?;
        Ok(self.observe(event))
    }

    /// Processes one event and returns the report it produces, if any.
    pub fn observe(&mut self, event: Event) -> Option<Report> {
        let Event { kind, snapshot } = event;
        let identity = snapshot.identity.clone();

        if let Some(relisted) = self.relisted.as_mut() {
            match kind {
                EventKind::Removed => relisted.remove(&identity),
                EventKind::Created | EventKind::Updated => relisted.insert(identity.clone()),
            };
        }

        match kind {
            EventKind::Created => {
                if self.cache.put(snapshot.clone()).is_some() {
                    debug!("Pod {} created again, replacing cached state", identity);
                }
                Some(Report::Created { identity, snapshot })
            }
            EventKind::Updated => {
                let deltas = match self.cache.get(&identity) {
                    Some(previous) => diff(previous, &snapshot),
                    None => {
                        debug!("Pod {} updated before it was seen, adopting as baseline", identity);
                        Vec::new()
                    }
                };
                self.cache.put(snapshot.clone());

                if deltas.is_empty() {
                    None
                } else {
                    Some(Report::Changed {
                        identity,
                        deltas,
                        snapshot,
                    })
                }
            }
            EventKind::Removed => self
                .cache
                .remove(&identity)
                .map(|last| Report::Removed { identity, snapshot: last }),
        }
    }

    /// Opens a resync: the upstream watcher is about to relist every Pod.
    ///
    /// Under [`ResyncPolicy::Clear`] the cache is emptied first. Opening a
    /// resync while one is already open restarts it.
    pub fn begin_resync(&mut self) {
        if self.policy == ResyncPolicy::Clear {
            debug!("Clearing {} cached pods before resync", self.cache.len());
            self.cache.clear();
        }
        self.relisted = Some(HashSet::new());
    }

    /// Closes a resync, evicting every cached Pod that was not relisted.
    ///
    /// Returns one `Removed` report per evicted Pod, ordered by identity.
    /// Without an open resync this does nothing.
    pub fn finish_resync(&mut self) -> Vec<Report> {
        let Some(relisted) = self.relisted.take() else {
            return Vec::new();
        };

        self.cache
            .identities()
            .into_iter()
            .filter(|identity| !relisted.contains(identity))
            .filter_map(|identity| {
                self.cache
                    .remove(&identity)
                    .map(|last| Report::Removed { identity, snapshot: last })
            })
            .collect()
    }

    /// Drops all cached state and any open resync.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.relisted = None;
    }
}
