//! Controller-specific error types.
//!
//! This module defines error types specific to the Pod Watch Controller
//! that are not covered by upstream library errors.

use thiserror::Error;
use kube::Error as KubeError;
use pod_diff::PodDiffError;

/// Errors that can occur in the Pod Watch Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Watched object could not be turned into a snapshot
    #[error("Pod event error: {0}")]
    PodDiff(#[from] PodDiffError),

    /// Watched object could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
