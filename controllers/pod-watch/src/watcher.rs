//! Kubernetes Pod watchers.
//!
//! This module handles watching Pods in one namespace and feeding every
//! event through a `Tracker`, forwarding the resulting reports.
//!
//! `kube_runtime::watcher` does not tell additions and modifications apart
//! (both arrive as `Apply`), so an applied Pod counts as created when the
//! tracker has never seen it and as updated otherwise. A relist arrives as
//! `Init`, `InitApply`..., `InitDone` and is mapped onto the tracker's
//! resync.
//!
//! Stream errors do not end the watch. The runtime watcher backs off,
//! resumes, and relists when its resource version has expired, so the
//! tracker's cache carries over into the relist.

use crate::error::ControllerError;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube_runtime::{watcher, WatchStreamExt};
use pod_diff::{Event, EventKind, ReportSink, Snapshot, Tracker};
use std::fmt;
use tracing::{debug, info, warn};

/// Turns watcher events for one namespace into reports.
#[derive(Debug)]
pub struct PodEventHandler<S> {
    namespace: String,
    tracker: Tracker,
    sink: S,
}

impl<S: ReportSink> PodEventHandler<S> {
    /// Creates a new handler owning `tracker` and `sink`.
    pub fn new(namespace: impl Into<String>, tracker: Tracker, sink: S) -> Self {
        Self {
            namespace: namespace.into(),
            tracker,
            sink,
        }
    }

    #[allow(dead_code)] // Used by tests to inspect cached state
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    #[allow(dead_code)] // Used by tests to inspect emitted reports
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Processes one watcher event.
    pub fn handle(&mut self, event: watcher::Event<Pod>) {
        match event {
            watcher::Event::Init => {
                info!("Pod watcher for {} relisting", self.namespace);
                self.tracker.begin_resync();
            }
            watcher::Event::InitApply(pod) | watcher::Event::Apply(pod) => {
                self.apply(&pod);
            }
            watcher::Event::Delete(pod) => {
                self.delete(&pod);
            }
            watcher::Event::InitDone => {
                let removals = self.tracker.finish_resync();
                info!(
                    "Pod watcher for {} relist complete: {} pods tracked, {} gone",
                    self.namespace,
                    self.tracker.cache().len(),
                    removals.len()
                );
                for report in &removals {
                    self.sink.emit(report);
                }
            }
        }
    }

    /// Feeds every item of `stream` through the handler until it ends.
    ///
    /// Errors are logged and skipped; the stream decides whether and when
    /// to resume.
    pub async fn consume<St, E>(&mut self, stream: St)
    where
        St: Stream<Item = Result<watcher::Event<Pod>, E>>,
        E: fmt::Display,
    {
        let mut stream = std::pin::pin!(stream);
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => self.handle(event),
                Err(e) => warn!("Pod watcher for {} stream error (resuming): {}", self.namespace, e),
            }
        }
    }

    fn apply(&mut self, pod: &Pod) {
        let Some(snapshot) = self.snapshot_or_skip(pod) else {
            return;
        };
        let kind = if self.tracker.is_known(&snapshot.identity) {
            EventKind::Updated
        } else {
            EventKind::Created
        };
        self.observe(Event::new(kind, snapshot));
    }

    fn delete(&mut self, pod: &Pod) {
        let Some(snapshot) = self.snapshot_or_skip(pod) else {
            return;
        };
        self.observe(Event::new(EventKind::Removed, snapshot));
    }

    fn observe(&mut self, event: Event) {
        debug!("Event Type: {} for pod {}", event.kind, event.snapshot.identity);
        if let Some(report) = self.tracker.observe(event) {
            self.sink.emit(&report);
        }
    }

    fn snapshot_or_skip(&self, pod: &Pod) -> Option<Snapshot> {
        match snapshot_of(pod) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                let name = pod.metadata.name.as_deref().unwrap_or("<unknown>");
                warn!("Skipping event for pod {} in {}: {}", name, self.namespace, e);
                None
            }
        }
    }
}

fn snapshot_of(pod: &Pod) -> Result<Snapshot, ControllerError> {
    let payload = serde_json::to_value(pod)?;
    Ok(Snapshot::from_value(&payload)?)
}

/// Watches Pods in one namespace.
pub struct PodWatcher<S> {
    api: Api<Pod>,
    handler: PodEventHandler<S>,
}

impl<S: ReportSink> PodWatcher<S> {
    /// Creates a new watcher instance.
    pub fn new(api: Api<Pod>, handler: PodEventHandler<S>) -> Self {
        Self { api, handler }
    }

    /// Watches until the stream ends, which the runtime watcher never does
    /// on its own.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Starting Pod watcher for namespace {}", self.handler.namespace);

        let stream = watcher(self.api.clone(), watcher::Config::default()).default_backoff();
        self.handler.consume(stream).await;

        Err(ControllerError::Watch(format!(
            "Pod watcher for {} ended unexpectedly",
            self.handler.namespace
        )))
    }
}
