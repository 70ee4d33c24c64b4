//! Pod diff errors

use thiserror::Error;

/// Errors that can occur while turning watch events into reports
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PodDiffError {
    /// Event payload does not carry a usable identity or tracked field
    #[error("Malformed event: {reason}")]
    MalformedEvent {
        /// What was wrong with the payload
        reason: String,
    },
}

impl PodDiffError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent { reason: reason.into() }
    }
}
