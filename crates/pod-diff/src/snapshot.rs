//! Pod snapshots
//!
//! A snapshot is the subset of a Pod that the diff engine tracks, extracted
//! from the JSON form of the object. Only the paths read here matter; the
//! rest of the payload is ignored, so any server version that still exposes
//! these fields is accepted.

use crate::error::PodDiffError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Stable key of a watched Pod within the observation scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    /// Namespace, absent for payloads that do not carry one
    pub namespace: Option<String>,
    /// Object name
    pub name: String,
}

impl Identity {
    /// Creates a namespaced identity.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Pod lifecycle phase (`status.phase`)
///
/// Values the API server may add later are kept verbatim in `Other` rather
/// than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Accepted but not all containers are running yet
    Pending,
    /// Bound to a node with at least one container running
    Running,
    /// All containers terminated successfully
    Succeeded,
    /// All containers terminated, at least one in failure
    Failed,
    /// State could not be obtained
    Unknown,
    /// Unrecognised phase string
    Other(String),
}

impl Phase {
    /// Returns the API string for this phase.
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Pending => "Pending",
            Phase::Running => "Running",
            Phase::Succeeded => "Succeeded",
            Phase::Failed => "Failed",
            Phase::Unknown => "Unknown",
            Phase::Other(other) => other,
        }
    }
}

impl From<&str> for Phase {
    fn from(value: &str) -> Self {
        match value {
            "Pending" => Phase::Pending,
            "Running" => Phase::Running,
            "Succeeded" => Phase::Succeeded,
            "Failed" => Phase::Failed,
            "Unknown" => Phase::Unknown,
            other => Phase::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Pod restart policy (`spec.restartPolicy`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Always restart containers
    Always,
    /// Restart containers that exit non-zero
    OnFailure,
    /// Never restart containers
    Never,
    /// Unrecognised policy string
    Other(String),
}

impl RestartPolicy {
    /// Returns the API string for this policy.
    pub fn as_str(&self) -> &str {
        match self {
            RestartPolicy::Always => "Always",
            RestartPolicy::OnFailure => "OnFailure",
            RestartPolicy::Never => "Never",
            RestartPolicy::Other(other) => other,
        }
    }
}

impl From<&str> for RestartPolicy {
    fn from(value: &str) -> Self {
        match value {
            "Always" => RestartPolicy::Always,
            "OnFailure" => RestartPolicy::OnFailure,
            "Never" => RestartPolicy::Never,
            other => RestartPolicy::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RestartPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Tracked fields of one observed Pod state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Pod identity
    pub identity: Identity,

    /// `status.phase`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,

    /// `spec.containers[0].image`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// `spec.restartPolicy`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,

    /// `status.hostIP`
    #[serde(rename = "hostIP", skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,

    /// `status.podIP`
    #[serde(rename = "podIP", skip_serializing_if = "Option::is_none")]
    pub pod_ip: Option<String>,

    /// `spec.terminationGracePeriodSeconds`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,

    /// `spec.activeDeadlineSeconds`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_deadline_seconds: Option<i64>,

    /// `spec.nodeName`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    /// `status.reason`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// `status.message`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Snapshot {
    /// Creates a snapshot with every tracked field unset.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            phase: None,
            image: None,
            restart_policy: None,
            host_ip: None,
            pod_ip: None,
            termination_grace_period_seconds: None,
            active_deadline_seconds: None,
            node_name: None,
            reason: None,
            message: None,
        }
    }

    /// Extracts a snapshot from the JSON form of a Pod.
    ///
    /// `metadata.name` is required. Every tracked field may be absent or
    /// `null`, but a field that is present with the wrong JSON type makes the
    /// whole payload malformed.
    pub fn from_value(payload: &Value) -> Result<Self, PodDiffError> {
        let name = text(payload, "metadata.name")?
            .filter(|name| !name.is_empty())
            .ok_or_else(|| PodDiffError::malformed("missing metadata.name"))?;
        let namespace = text(payload, "metadata.namespace")?.filter(|ns| !ns.is_empty());

        Ok(Self {
            identity: Identity { namespace, name },
            phase: text(payload, "status.phase")?.as_deref().map(Phase::from),
            image: primary_image(payload)?,
            restart_policy: text(payload, "spec.restartPolicy")?
                .as_deref()
                .map(RestartPolicy::from),
            host_ip: text(payload, "status.hostIP")?,
            pod_ip: text(payload, "status.podIP")?,
            termination_grace_period_seconds: seconds(payload, "spec.terminationGracePeriodSeconds")?,
            active_deadline_seconds: seconds(payload, "spec.activeDeadlineSeconds")?,
            node_name: text(payload, "spec.nodeName")?,
            reason: text(payload, "status.reason")?,
            message: text(payload, "status.message")?,
        })
    }
}

/// Walks a dotted path; absent and `null` both read as `None`.
fn lookup<'a>(payload: &'a Value, path: &str) -> Result<Option<&'a Value>, PodDiffError> {
    let mut current = payload;
    for segment in path.split('.') {
        let object = current.as_object().ok_or_else(|| {
            PodDiffError::malformed(format!("expected an object while reading {path}"))
        })?;
        match object.get(segment) {
            None | Some(Value::Null) => return Ok(None),
            Some(next) => current = next,
        }
    }
    Ok(Some(current))
}

fn text(payload: &Value, path: &str) -> Result<Option<String>, PodDiffError> {
    match lookup(payload, path)? {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(PodDiffError::malformed(format!("{path} must be a string"))),
    }
}

fn seconds(payload: &Value, path: &str) -> Result<Option<i64>, PodDiffError> {
    match lookup(payload, path)? {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| PodDiffError::malformed(format!("{path} must be an integer"))),
    }
}

fn primary_image(payload: &Value) -> Result<Option<String>, PodDiffError> {
    let Some(containers) = lookup(payload, "spec.containers")? else {
        return Ok(None);
    };
    let containers = containers
        .as_array()
        .ok_or_else(|| PodDiffError::malformed("spec.containers must be an array"))?;
    match containers.first() {
        None => Ok(None),
        Some(first) => text(first, "image"),
    }
}
