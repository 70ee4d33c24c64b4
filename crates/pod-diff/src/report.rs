//! Reports and the reporting seam
//!
//! A [`Report`] is what one processed event produces, if anything. Where it
//! goes (log line, queue, test buffer) is up to the [`ReportSink`].

use crate::diff::FieldDelta;
use crate::snapshot::{Identity, Snapshot};
use serde::Serialize;

/// Outcome of one watch event worth telling someone about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Report {
    /// First observation of a Pod through a creation event
    Created {
        /// Pod identity
        identity: Identity,
        /// State at creation
        snapshot: Snapshot,
    },

    /// Tracked fields changed; `deltas` is never empty
    Changed {
        /// Pod identity
        identity: Identity,
        /// Changed fields in table order
        deltas: Vec<FieldDelta>,
        /// New state
        snapshot: Snapshot,
    },

    /// Pod went away; `snapshot` is the last one observed
    Removed {
        /// Pod identity
        identity: Identity,
        /// Last cached state
        snapshot: Snapshot,
    },
}

impl Report {
    /// Identity of the Pod the report is about.
    pub fn identity(&self) -> &Identity {
        match self {
            Report::Created { identity, .. }
            | Report::Changed { identity, .. }
            | Report::Removed { identity, .. } => identity,
        }
    }

    /// Snapshot carried by the report (new state, or last state for removals).
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            Report::Created { snapshot, .. }
            | Report::Changed { snapshot, .. }
            | Report::Removed { snapshot, .. } => snapshot,
        }
    }

    /// Deltas carried by the report; empty for creations and removals.
    pub fn deltas(&self) -> &[FieldDelta] {
        match self {
            Report::Changed { deltas, .. } => deltas,
            Report::Created { .. } | Report::Removed { .. } => &[],
        }
    }

    /// Short kind label, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Report::Created { .. } => "created",
            Report::Changed { .. } => "changed",
            Report::Removed { .. } => "removed",
        }
    }
}

/// Receives reports in the order their events were processed
pub trait ReportSink {
    /// Accepts one report.
    fn emit(&mut self, report: &Report);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, report: &Report) {
        (**self).emit(report);
    }
}

/// Sink that keeps every report in memory, for tests
#[cfg(feature = "test-util")]
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    reports: Vec<Report>,
}

#[cfg(feature = "test-util")]
impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports received so far, oldest first.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Takes the recorded reports, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }
}

#[cfg(feature = "test-util")]
impl ReportSink for RecordingSink {
    fn emit(&mut self, report: &Report) {
        self.reports.push(report.clone());
    }
}
