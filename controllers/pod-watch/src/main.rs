//! Pod Watch Controller
//!
//! Watches Pods and reports which tracked fields changed between consecutive
//! observations of each Pod: phase, image, restart policy, addresses,
//! deadlines, node assignment and status reason/message.
//!
//! Reports are written to the log; see `config` for the environment
//! variables that shape them.

mod config;
mod controller;
mod error;
mod reporter;
mod watcher;

use crate::config::ControllerConfig;
use crate::controller::Controller;
use crate::error::ControllerError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kube's rustls transport needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A rustls crypto provider was already installed");
    }

    info!("Starting Pod Watch Controller");

    // Load configuration from environment variables
    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespaces: {}", config.namespaces.join(", "));
    info!("  Report format: {}", config.report_format);
    info!("  Include snapshot: {}", config.include_snapshot);
    info!("  Resync policy: {}", config.resync_policy);

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
