//! Tracing Observer
//!
//! Forwards deployment events to `tracing` at debug level.

use tracing::debug;

use crate::domain::ports::{DeployEvent, DeploymentObserver};

/// Observer that logs every event as a structured record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl DeploymentObserver for TracingObserver {
    fn on_event(&self, event: &DeployEvent) {
        match event {
            DeployEvent::Started(info) | DeployEvent::UpToDate(info) | DeployEvent::Ended(info) => {
                debug!(
                    event = event.name(),
                    project = %info.project_name,
                    remote = %info.remote_name,
                    install = info.install
                );
            }
            DeployEvent::Stat { changes, .. } => {
                debug!(event = "stat", stats = %changes.stats());
            }
            DeployEvent::Added { path }
            | DeployEvent::Modified { path }
            | DeployEvent::Deleted { path } => {
                debug!(event = event.name(), %path);
            }
            DeployEvent::Copied { source } => {
                debug!(event = "copied", %source);
            }
            DeployEvent::Renamed {
                source,
                destination,
            } => {
                debug!(event = "renamed", %source, %destination);
            }
            _ => debug!(event = event.name()),
        }
    }
}
