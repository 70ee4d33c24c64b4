//! Field diff engine
//!
//! The tracked fields live in one table, [`TRACKED_FIELDS`]. Each row names
//! the field, reads it from a [`Snapshot`] into a [`FieldValue`], and says
//! which equality rule decides whether two readings differ. [`diff`] walks the
//! table in order, so deltas always come out in table order.

use crate::snapshot::Snapshot;
use serde::Serialize;
use std::fmt;

/// Uniform value shape the diff table reads out of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Field absent from the object
    Unset,
    /// String or enumerated value
    Text(String),
    /// Duration in whole seconds
    Seconds(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unset => f.write_str("<unset>"),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Seconds(seconds) => write!(f, "{seconds}"),
        }
    }
}

/// How two readings of the same field are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    /// Exact string equality; the empty string and unset are the same value
    Text,
    /// Exact equality of enumerated values
    Exact,
    /// Numeric equality; unset only equals unset
    Duration,
}

impl Equality {
    /// Returns true when `previous` and `current` count as unchanged.
    pub fn same(self, previous: &FieldValue, current: &FieldValue) -> bool {
        match self {
            Equality::Text => blank_as_unset(previous) == blank_as_unset(current),
            Equality::Exact => previous == current,
            Equality::Duration => match (previous, current) {
                (FieldValue::Seconds(a), FieldValue::Seconds(b)) => a == b,
                (FieldValue::Unset, FieldValue::Unset) => true,
                _ => false,
            },
        }
    }
}

fn blank_as_unset(value: &FieldValue) -> &FieldValue {
    match value {
        FieldValue::Text(text) if text.is_empty() => &FieldValue::Unset,
        other => other,
    }
}

/// One row of the tracked-field table
#[derive(Debug, Clone, Copy)]
pub struct TrackedField {
    /// Field name as reported in deltas
    pub name: &'static str,
    /// Reads the field from a snapshot
    pub read: fn(&Snapshot) -> FieldValue,
    /// Equality rule for this field
    pub equality: Equality,
}

impl TrackedField {
    /// Compares this field across two snapshots.
    pub fn compare(&self, old: &Snapshot, new: &Snapshot) -> Option<FieldDelta> {
        let previous = (self.read)(old);
        let current = (self.read)(new);
        if self.equality.same(&previous, &current) {
            None
        } else {
            Some(FieldDelta {
                field: self.name,
                previous,
                current,
            })
        }
    }
}

/// Fields compared between consecutive observations, in report order.
pub static TRACKED_FIELDS: [TrackedField; 10] = [
    TrackedField { name: "phase", read: phase, equality: Equality::Exact },
    TrackedField { name: "image", read: image, equality: Equality::Text },
    TrackedField { name: "restartPolicy", read: restart_policy, equality: Equality::Exact },
    TrackedField { name: "hostIP", read: host_ip, equality: Equality::Text },
    TrackedField { name: "podIP", read: pod_ip, equality: Equality::Text },
    TrackedField {
        name: "terminationGracePeriodSeconds",
        read: termination_grace_period,
        equality: Equality::Duration,
    },
    TrackedField { name: "activeDeadlineSeconds", read: active_deadline, equality: Equality::Duration },
    TrackedField { name: "nodeName", read: node_name, equality: Equality::Text },
    TrackedField { name: "reason", read: reason, equality: Equality::Text },
    TrackedField { name: "message", read: message, equality: Equality::Text },
];

fn text(value: Option<&str>) -> FieldValue {
    value.map_or(FieldValue::Unset, |text| FieldValue::Text(text.to_string()))
}

fn duration(value: Option<i64>) -> FieldValue {
    value.map_or(FieldValue::Unset, FieldValue::Seconds)
}

fn phase(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.phase.as_ref().map(|phase| phase.as_str()))
}

fn image(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.image.as_deref())
}

fn restart_policy(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.restart_policy.as_ref().map(|policy| policy.as_str()))
}

fn host_ip(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.host_ip.as_deref())
}

fn pod_ip(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.pod_ip.as_deref())
}

fn termination_grace_period(snapshot: &Snapshot) -> FieldValue {
    duration(snapshot.termination_grace_period_seconds)
}

fn active_deadline(snapshot: &Snapshot) -> FieldValue {
    duration(snapshot.active_deadline_seconds)
}

fn node_name(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.node_name.as_deref())
}

fn reason(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.reason.as_deref())
}

fn message(snapshot: &Snapshot) -> FieldValue {
    text(snapshot.message.as_deref())
}

/// One changed field between two observations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDelta {
    /// Name from [`TRACKED_FIELDS`]
    pub field: &'static str,
    /// Value in the older snapshot
    pub previous: FieldValue,
    /// Value in the newer snapshot
    pub current: FieldValue,
}

impl fmt::Display for FieldDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Previous Value: {}, New Value: {}",
            self.field, self.previous, self.current
        )
    }
}

/// Computes the tracked-field deltas from `old` to `new`.
///
/// Both snapshots are expected to describe the same Pod; this is not checked.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<FieldDelta> {
    TRACKED_FIELDS
        .iter()
        .filter_map(|field| field.compare(old, new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Identity, Phase, RestartPolicy};
    use std::collections::HashSet;

    fn baseline() -> Snapshot {
        Snapshot {
            phase: Some(Phase::Pending),
            image: Some("nginx:1.25".to_string()),
            restart_policy: Some(RestartPolicy::Always),
            termination_grace_period_seconds: Some(30),
            ..Snapshot::new(Identity::new("default", "pod-x"))
        }
    }

    /// A snapshot that differs from `baseline()` in every tracked field
    fn everything_changed() -> Snapshot {
        Snapshot {
            phase: Some(Phase::Running),
            image: Some("nginx:1.26".to_string()),
            restart_policy: Some(RestartPolicy::Never),
            host_ip: Some("10.0.0.5".to_string()),
            pod_ip: Some("10.244.0.9".to_string()),
            termination_grace_period_seconds: Some(60),
            active_deadline_seconds: Some(600),
            node_name: Some("node-a".to_string()),
            reason: Some("Evicted".to_string()),
            message: Some("The node was low on resource: memory.".to_string()),
            ..baseline()
        }
    }

    #[test]
    fn test_diff_identical_is_empty() {
        assert!(diff(&baseline(), &baseline()).is_empty());
        assert!(diff(&everything_changed(), &everything_changed()).is_empty());
    }

    #[test]
    fn test_diff_single_phase_change() {
        let new = Snapshot {
            phase: Some(Phase::Running),
            ..baseline()
        };

        assert_eq!(
            diff(&baseline(), &new),
            vec![FieldDelta {
                field: "phase",
                previous: FieldValue::Text("Pending".to_string()),
                current: FieldValue::Text("Running".to_string()),
            }]
        );
    }

    #[test]
    fn test_diff_follows_table_order() {
        let deltas = diff(&baseline(), &everything_changed());
        let fields: Vec<&str> = deltas.iter().map(|delta| delta.field).collect();
        let table: Vec<&str> = TRACKED_FIELDS.iter().map(|field| field.name).collect();

        assert_eq!(fields, table);
    }

    #[test]
    fn test_diff_fields_are_unique_and_tracked() {
        let table: HashSet<&str> = TRACKED_FIELDS.iter().map(|field| field.name).collect();
        assert_eq!(table.len(), TRACKED_FIELDS.len(), "table names must be unique");

        for (old, new) in [
            (baseline(), everything_changed()),
            (everything_changed(), baseline()),
            (baseline(), Snapshot::new(Identity::new("default", "pod-x"))),
        ] {
            let deltas = diff(&old, &new);
            let seen: HashSet<&str> = deltas.iter().map(|delta| delta.field).collect();
            assert_eq!(seen.len(), deltas.len());
            assert!(seen.is_subset(&table));
        }
    }

    #[test]
    fn test_blank_text_equals_unset() {
        let old = Snapshot {
            pod_ip: None,
            message: Some(String::new()),
            ..baseline()
        };
        let new = Snapshot {
            pod_ip: Some(String::new()),
            message: None,
            ..baseline()
        };

        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn test_duration_unset_versus_set() {
        let old = Snapshot {
            active_deadline_seconds: None,
            ..baseline()
        };
        let new = Snapshot {
            active_deadline_seconds: Some(0),
            ..baseline()
        };

        assert_eq!(
            diff(&old, &new),
            vec![FieldDelta {
                field: "activeDeadlineSeconds",
                previous: FieldValue::Unset,
                current: FieldValue::Seconds(0),
            }]
        );
    }

    #[test]
    fn test_equality_rules() {
        let unset = FieldValue::Unset;
        let blank = FieldValue::Text(String::new());
        let thirty = FieldValue::Seconds(30);

        assert!(Equality::Text.same(&unset, &blank));
        assert!(!Equality::Exact.same(&unset, &blank));
        assert!(Equality::Duration.same(&unset, &unset));
        assert!(Equality::Duration.same(&thirty, &FieldValue::Seconds(30)));
        assert!(!Equality::Duration.same(&unset, &thirty));
    }

    #[test]
    fn test_delta_display() {
        let delta = FieldDelta {
            field: "nodeName",
            previous: FieldValue::Unset,
            current: FieldValue::Text("node-a".to_string()),
        };

        assert_eq!(delta.to_string(), "nodeName: Previous Value: <unset>, New Value: node-a");
    }
}
