//! Main controller implementation.
//!
//! This module contains the `Controller` struct that starts one Pod
//! watcher per configured namespace. Each watcher owns its own tracker and
//! reporter, so namespaces share no state.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reporter::LogReporter;
use crate::watcher::{PodEventHandler, PodWatcher};
use futures::future::select_all;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use pod_diff::Tracker;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Main controller for Pod change monitoring.
pub struct Controller {
    namespaces: Vec<String>,
    watchers: Vec<JoinHandle<Result<(), ControllerError>>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watchers.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Pod Watch Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        let mut watchers = Vec::with_capacity(config.namespaces.len());
        for namespace in &config.namespaces {
            let api: Api<Pod> = Api::namespaced(kube_client.clone(), namespace);
            let handler = PodEventHandler::new(
                namespace.clone(),
                Tracker::with_policy(config.resync_policy),
                LogReporter::new(config.report_format, config.include_snapshot),
            );
            let watcher_instance = PodWatcher::new(api, handler);

            // Start watcher in a background task
            watchers.push(tokio::spawn(async move { watcher_instance.run().await }));
        }

        Ok(Self {
            namespaces: config.namespaces,
            watchers,
        })
    }

    /// Runs the controller until a watcher stops.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Pod Watch Controller running");

        if self.watchers.is_empty() {
            return Err(ControllerError::InvalidConfig("no namespaces to watch".to_string()));
        }

        // Watchers run forever; the first one to exit brings the controller down
        let (result, index, remaining) = select_all(self.watchers).await;
        for handle in remaining {
            handle.abort();
        }

        let namespace = &self.namespaces[index];
        let outcome = result
            .map_err(|e| ControllerError::Watch(format!("Pod watcher for {} panicked: {}", namespace, e)))
            .and_then(|watch| watch);

        if let Err(e) = &outcome {
            error!("Pod watcher for {} stopped: {}", namespace, e);
        }
        outcome
    }
}
