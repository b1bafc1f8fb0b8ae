//! JSON Observer
//!
//! Writes deployment events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::domain::ports::{DeployEvent, DeploymentInfo, DeploymentObserver};

/// Observer that writes one JSON object per event
pub struct JsonObserver {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonObserver {
    /// Create a JSON observer writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Create a JSON observer writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

fn lifecycle(name: &str, info: &DeploymentInfo) -> Value {
    json!({
        "event": name,
        "command": "deploy",
        "project": info.project_name,
        "remote": info.remote_name,
        "branch": info.target.branch,
        "install": info.install,
        "started_at": info.started_at.map(|t| t.to_rfc3339()),
    })
}

/// JSON representation of one event
pub fn event_to_json(event: &DeployEvent) -> Value {
    match event {
        DeployEvent::Started(info) | DeployEvent::UpToDate(info) | DeployEvent::Ended(info) => {
            lifecycle(event.name(), info)
        }

        DeployEvent::Stat {
            deployment,
            changes,
        } => {
            let stats = changes.stats();
            json!({
                "event": "stat",
                "command": "deploy",
                "project": deployment.project_name,
                "remote": deployment.remote_name,
                "added": stats.added,
                "modified": stats.modified,
                "copied": stats.copied,
                "renamed": stats.renamed,
                "deleted": stats.deleted,
                "total": stats.total(),
            })
        }

        DeployEvent::Added { path }
        | DeployEvent::Modified { path }
        | DeployEvent::Deleted { path } => json!({
            "event": event.name(),
            "command": "deploy",
            "path": path.as_str(),
        }),

        DeployEvent::Copied { source } => json!({
            "event": "copied",
            "command": "deploy",
            "source": source.as_str(),
        }),

        DeployEvent::Renamed {
            source,
            destination,
        } => json!({
            "event": "renamed",
            "command": "deploy",
            "source": source.as_str(),
            "destination": destination.as_str(),
        }),

        DeployEvent::AddStart
        | DeployEvent::AddEnd
        | DeployEvent::ModifiedStart
        | DeployEvent::ModifiedEnd
        | DeployEvent::CopiedStart
        | DeployEvent::CopiedEnd
        | DeployEvent::RenamedStart
        | DeployEvent::RenamedEnd
        | DeployEvent::DeletedStart
        | DeployEvent::DeletedEnd => json!({
            "event": event.name(),
            "command": "deploy",
        }),
    }
}

impl DeploymentObserver for JsonObserver {
    fn on_event(&self, event: &DeployEvent) {
        self.write_event(event_to_json(event));
    }
}
