//! Controller configuration.
//!
//! Everything is read from environment variables:
//! - `WATCH_NAMESPACE`: comma-separated namespaces (default `default`)
//! - `REPORT_FORMAT`: `text` or `json` (default `text`)
//! - `INCLUDE_SNAPSHOT`: log the full snapshot with each report (default `false`)
//! - `RESYNC_POLICY`: `reconcile` or `clear` (default `reconcile`)

use crate::error::ControllerError;
use pod_diff::ResyncPolicy;
use std::env;
use std::fmt;

const DEFAULT_NAMESPACE: &str = "default";

/// How reports are written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable lines, one per delta
    #[default]
    Text,
    /// One JSON object per report
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        })
    }
}

/// Pod Watch Controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespaces to watch, one watcher each
    pub namespaces: Vec<String>,
    /// How reports are written
    pub report_format: ReportFormat,
    /// Log the full snapshot with text reports
    pub include_snapshot: bool,
    /// Cache handling when a watcher relists
    pub resync_policy: ResyncPolicy,
}

impl ControllerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespaces = parse_namespaces(lookup("WATCH_NAMESPACE").as_deref())?;

        let report_format = match lookup("REPORT_FORMAT").as_deref().map(str::trim) {
            None | Some("") => ReportFormat::default(),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "text" => ReportFormat::Text,
                "json" => ReportFormat::Json,
                other => {
                    return Err(ControllerError::InvalidConfig(format!(
                        "REPORT_FORMAT must be 'text' or 'json', got '{}'",
                        other
                    )))
                }
            },
        };

        let include_snapshot = match lookup("INCLUDE_SNAPSHOT").as_deref().map(str::trim) {
            None | Some("") => false,
            Some(value) => parse_bool("INCLUDE_SNAPSHOT", value)?,
        };

        let resync_policy = match lookup("RESYNC_POLICY").as_deref().map(str::trim) {
            None | Some("") => ResyncPolicy::default(),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "reconcile" => ResyncPolicy::Reconcile,
                "clear" => ResyncPolicy::Clear,
                other => {
                    return Err(ControllerError::InvalidConfig(format!(
                        "RESYNC_POLICY must be 'reconcile' or 'clear', got '{}'",
                        other
                    )))
                }
            },
        };

        Ok(Self {
            namespaces,
            report_format,
            include_snapshot,
            resync_policy,
        })
    }
}

fn parse_namespaces(raw: Option<&str>) -> Result<Vec<String>, ControllerError> {
    let Some(raw) = raw else {
        return Ok(vec![DEFAULT_NAMESPACE.to_string()]);
    };

    let mut namespaces: Vec<String> = Vec::new();
    for namespace in raw.split(',').map(str::trim).filter(|ns| !ns.is_empty()) {
        if !namespaces.iter().any(|known| known == namespace) {
            namespaces.push(namespace.to_string());
        }
    }

    if namespaces.is_empty() {
        return Err(ControllerError::InvalidConfig(
            "WATCH_NAMESPACE is set but names no namespace".to_string(),
        ));
    }
    Ok(namespaces)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ControllerError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ControllerError::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
