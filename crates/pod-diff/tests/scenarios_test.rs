//! End-to-end scenarios for the tracker
//!
//! Feeds JSON Pod payloads through `Tracker::handle` and forwards reports to a
//! `RecordingSink`, the same way the watch loop does.

use pod_diff::{
    diff, EventKind, FieldDelta, FieldValue, Identity, Phase, RecordingSink, Report, ReportSink,
    Snapshot, Tracker,
};
use serde_json::{json, Value};

fn pod(name: &str, phase: &str) -> Value {
    json!({
        "metadata": {
            "name": name,
            "namespace": "default",
            "labels": { "app": "web" }
        },
        "spec": {
            "containers": [{ "name": "web", "image": "nginx:1.25" }],
            "restartPolicy": "Always",
            "terminationGracePeriodSeconds": 30
        },
        "status": { "phase": phase }
    })
}

fn feed(tracker: &mut Tracker, sink: &mut RecordingSink, kind: EventKind, payload: &Value) {
    if let Some(report) = tracker.handle(kind, payload).expect("payload should be valid") {
        sink.emit(&report);
    }
}

fn id(name: &str) -> Identity {
    Identity::new("default", name)
}

#[test]
fn test_scenario_a_creation() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();

    feed(&mut tracker, &mut sink, EventKind::Created, &pod("pod-x", "Pending"));

    let cached = tracker.cache().get(&id("pod-x")).expect("pod-x should be cached");
    assert_eq!(cached.phase, Some(Phase::Pending));

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind(), "created");
    assert!(reports[0].deltas().is_empty());
}

#[test]
fn test_scenario_b_phase_transition() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();

    feed(&mut tracker, &mut sink, EventKind::Created, &pod("pod-x", "Pending"));
    feed(&mut tracker, &mut sink, EventKind::Updated, &pod("pod-x", "Running"));

    let reports = sink.drain();
    assert_eq!(reports.len(), 2);
    assert_eq!(
        reports[1],
        Report::Changed {
            identity: id("pod-x"),
            deltas: vec![FieldDelta {
                field: "phase",
                previous: FieldValue::Text("Pending".to_string()),
                current: FieldValue::Text("Running".to_string()),
            }],
            snapshot: Snapshot::from_value(&pod("pod-x", "Running")).expect("valid pod"),
        }
    );
}

#[test]
fn test_scenario_c_untracked_change_is_suppressed() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();
    feed(&mut tracker, &mut sink, EventKind::Created, &pod("pod-x", "Running"));
    sink.drain();

    let mut relabelled = pod("pod-x", "Running");
    relabelled["metadata"]["labels"]["tier"] = json!("frontend");
    relabelled["metadata"]["resourceVersion"] = json!("1234");
    feed(&mut tracker, &mut sink, EventKind::Updated, &relabelled);

    assert!(sink.reports().is_empty());
    assert_eq!(
        tracker.cache().get(&id("pod-x")),
        Some(&Snapshot::from_value(&relabelled).expect("valid pod"))
    );
}

#[test]
fn test_scenario_d_update_for_unknown_pod() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();

    feed(&mut tracker, &mut sink, EventKind::Updated, &pod("pod-y", "Running"));

    assert!(sink.reports().is_empty());
    assert!(tracker.is_known(&id("pod-y")));

    // The adopted baseline is diffed against on the next update
    feed(&mut tracker, &mut sink, EventKind::Updated, &pod("pod-y", "Succeeded"));
    assert_eq!(sink.reports().len(), 1);
}

#[test]
fn test_scenario_e_removal() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();
    feed(&mut tracker, &mut sink, EventKind::Created, &pod("pod-x", "Pending"));
    feed(&mut tracker, &mut sink, EventKind::Updated, &pod("pod-x", "Running"));
    sink.drain();

    feed(&mut tracker, &mut sink, EventKind::Removed, &pod("pod-x", "Running"));

    assert!(!tracker.is_known(&id("pod-x")));
    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind(), "removed");
    assert_eq!(reports[0].snapshot().phase, Some(Phase::Running));
}

#[test]
fn test_repeated_update_reports_once() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();
    feed(&mut tracker, &mut sink, EventKind::Created, &pod("pod-x", "Pending"));
    sink.drain();

    feed(&mut tracker, &mut sink, EventKind::Updated, &pod("pod-x", "Running"));
    feed(&mut tracker, &mut sink, EventKind::Updated, &pod("pod-x", "Running"));

    assert_eq!(sink.reports().len(), 1);
}

#[test]
fn test_interleaved_pods_keep_their_order() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();

    let events = [
        (EventKind::Created, pod("a", "Pending")),
        (EventKind::Created, pod("b", "Pending")),
        (EventKind::Updated, pod("b", "Running")),
        (EventKind::Updated, pod("a", "Running")),
        (EventKind::Updated, pod("a", "Succeeded")),
        (EventKind::Removed, pod("b", "Running")),
        (EventKind::Removed, pod("a", "Succeeded")),
    ];
    for (kind, payload) in &events {
        feed(&mut tracker, &mut sink, *kind, payload);
    }

    let timeline = |name: &str| -> Vec<String> {
        sink.reports()
            .iter()
            .filter(|report| report.identity() == &id(name))
            .map(|report| match report.deltas().first() {
                Some(delta) => format!("{}:{}", report.kind(), delta.current),
                None => report.kind().to_string(),
            })
            .collect()
    };

    assert_eq!(
        timeline("a"),
        vec!["created", "changed:Running", "changed:Succeeded", "removed"]
    );
    assert_eq!(timeline("b"), vec!["created", "changed:Running", "removed"]);
    assert!(tracker.cache().is_empty());
}

#[test]
fn test_malformed_event_is_skipped() {
    let mut tracker = Tracker::new();
    let mut sink = RecordingSink::new();
    feed(&mut tracker, &mut sink, EventKind::Created, &pod("pod-x", "Pending"));

    let result = tracker.handle(EventKind::Removed, &json!({ "metadata": {} }));

    assert!(result.is_err());
    assert!(tracker.is_known(&id("pod-x")));
}

#[test]
fn test_diff_detects_exactly_the_changed_fields() {
    let base = Snapshot::from_value(&pod("pod-x", "Running")).expect("valid pod");
    assert!(diff(&base, &base).is_empty());

    let mut moved = pod("pod-x", "Running");
    moved["spec"]["nodeName"] = json!("node-b");
    moved["status"]["podIP"] = json!("10.244.3.4");
    let moved = Snapshot::from_value(&moved).expect("valid pod");

    let fields: Vec<&str> = diff(&base, &moved).iter().map(|delta| delta.field).collect();
    assert_eq!(fields, vec!["podIP", "nodeName"]);
}
