//! Pod Diff
//!
//! State tracking and field diffing for a stream of Pod watch events.
//! Keeps the last observed snapshot of every Pod and reports which tracked
//! fields changed between consecutive observations.
//!
//! # Example
//!
//! ```
//! use pod_diff::{EventKind, Report, Tracker};
//! use serde_json::json;
//!
//! let mut tracker = Tracker::new();
//!
//! let pending = json!({
//!     "metadata": { "name": "web-0", "namespace": "default" },
//!     "status": { "phase": "Pending" }
//! });
//! let running = json!({
//!     "metadata": { "name": "web-0", "namespace": "default" },
//!     "status": { "phase": "Running" }
//! });
//!
//! tracker.handle(EventKind::Created, &pending)?;
//! let report = tracker.handle(EventKind::Updated, &running)?;
//!
//! if let Some(Report::Changed { deltas, .. }) = report {
//!     assert_eq!(deltas[0].to_string(), "phase: Previous Value: Pending, New Value: Running");
//! }
//! # Ok::<(), pod_diff::PodDiffError>(())
//! ```
//!
//! # Features
//!
//! - **Snapshot extraction**: reads the tracked fields from any Pod-shaped JSON
//! - **Diff engine**: one table of tracked fields with per-field equality rules
//! - **Event classification**: created / updated / removed, plus relist handling
//! - **Reporting seam**: [`ReportSink`] trait; `RecordingSink` behind `test-util`

pub mod cache;
pub mod diff;
pub mod error;
pub mod report;
pub mod snapshot;
pub mod tracker;

pub use cache::StateCache;
pub use diff::{diff, Equality, FieldDelta, FieldValue, TrackedField, TRACKED_FIELDS};
pub use error::PodDiffError;
#[cfg(feature = "test-util")]
pub use report::RecordingSink;
pub use report::{Report, ReportSink};
pub use snapshot::{Identity, Phase, RestartPolicy, Snapshot};
pub use tracker::{Event, EventKind, ResyncPolicy, Tracker};
