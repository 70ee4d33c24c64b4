//! Report output.
//!
//! Writes tracker reports to the log, either as readable lines or as one
//! JSON object per report.

use crate::config::ReportFormat;
use chrono::{DateTime, Utc};
use pod_diff::{Report, ReportSink};
use serde::Serialize;
use tracing::{info, warn};

/// JSON envelope for a report.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    observed_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a Report,
}

/// Sink that logs every report through `tracing`.
#[derive(Debug, Clone)]
pub struct LogReporter {
    format: ReportFormat,
    include_snapshot: bool,
}

impl LogReporter {
    /// Creates a new reporter.
    pub fn new(format: ReportFormat, include_snapshot: bool) -> Self {
        Self {
            format,
            include_snapshot,
        }
    }

    /// Renders a report into the log lines it produces.
    pub fn render(&self, report: &Report, observed_at: DateTime<Utc>) -> Vec<String> {
        match self.format {
            ReportFormat::Text => self.render_text(report),
            ReportFormat::Json => {
                let envelope = JsonReport { observed_at, report };
                match serde_json::to_string(&envelope) {
                    Ok(line) => vec![line],
                    Err(e) => {
                        warn!("Failed to serialize report for {}: {}", report.identity(), e);
                        Vec::new()
                    }
                }
            }
        }
    }

    fn render_text(&self, report: &Report) -> Vec<String> {
        let mut lines = vec![match report {
            Report::Created { identity, .. } => format!("Pod added: {}", identity),
            Report::Changed { identity, .. } => format!("Modified Pod: {}", identity),
            Report::Removed { identity, .. } => format!("Pod removed: {}", identity),
        }];

        lines.extend(report.deltas().iter().map(|delta| format!("  {}", delta)));

        if self.include_snapshot {
            match serde_json::to_string_pretty(report.snapshot()) {
                Ok(details) => lines.push(format!("  Full Pod Details: {}", details)),
                Err(e) => warn!("Failed to serialize snapshot for {}: {}", report.identity(), e),
            }
        }

        lines
    }
}

impl ReportSink for LogReporter {
    fn emit(&mut self, report: &Report) {
        for line in self.render(report, Utc::now()) {
            info!("{}", line);
        }
    }
}
