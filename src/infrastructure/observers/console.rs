//! Console Observer
//!
//! Human-readable progress lines for interactive use.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{DeployEvent, DeploymentInfo, DeploymentObserver};

/// Observer that prints progress as plain text
pub struct ConsoleObserver {
    writer: Mutex<Box<dyn Write + Send>>,
    /// Print one line per file
    detailed: bool,
}

impl ConsoleObserver {
    /// Write progress to stderr
    pub fn stderr(detailed: bool) -> Self {
        Self::with_writer(io::stderr(), detailed)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, detailed: bool) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            detailed,
        }
    }

    fn line(&self, text: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text);
            let _ = writer.flush();
        }
    }
}

fn describe(info: &DeploymentInfo) -> String {
    let mut text = format!("{} -> {}", info.project_name, info.remote_name);
    if let Some(branch) = &info.target.branch {
        text.push_str(&format!(" [{}]", branch));
    }
    text
}

/// Progress line for an event, if it prints one
pub fn render(event: &DeployEvent) -> Option<String> {
    let text = match event {
        DeployEvent::Started(info) if info.install => {
            format!("Deploying {} (full install)", describe(info))
        }
        DeployEvent::Started(info) => format!("Deploying {}", describe(info)),
        DeployEvent::UpToDate(_) => "Already up to date".to_string(),
        DeployEvent::Stat { changes, .. } if changes.is_empty() => "No file changes".to_string(),
        DeployEvent::Stat { changes, .. } => format!("Changes: {}", changes.stats()),
        DeployEvent::AddStart => "Uploading new files".to_string(),
        DeployEvent::ModifiedStart => "Uploading modified files".to_string(),
        DeployEvent::CopiedStart => "Copying files".to_string(),
        DeployEvent::RenamedStart => "Renaming files".to_string(),
        DeployEvent::DeletedStart => "Deleting files".to_string(),
        DeployEvent::Added { path } => format!("  + {}", path),
        DeployEvent::Modified { path } => format!("  ~ {}", path),
        DeployEvent::Copied { source } => format!("  = copied from {}", source),
        DeployEvent::Renamed {
            source,
            destination,
        } => format!("  > {} -> {}", source, destination),
        DeployEvent::Deleted { path } => format!("  - {}", path),
        DeployEvent::Ended(info) => format!("Finished {}", describe(info)),
        DeployEvent::AddEnd
        | DeployEvent::ModifiedEnd
        | DeployEvent::CopiedEnd
        | DeployEvent::RenamedEnd
        | DeployEvent::DeletedEnd => return None,
    };
    Some(text)
}

impl DeploymentObserver for ConsoleObserver {
    fn on_event(&self, event: &DeployEvent) {
        if let Some(text) = render(event) {
            self.line(&text);
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.detailed
    }
}
