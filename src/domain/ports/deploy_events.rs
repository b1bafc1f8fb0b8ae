//! Deployment Observer Port
//!
//! Lifecycle events emitted by a deployment run, for progress display,
//! JSON event streams and logging.

use chrono::{DateTime, Utc};

use crate::domain::entities::{Bucket, FileChangeSet};
use crate::domain::value_objects::{ProjectTarget, RepoPath};

/// Snapshot of the deployment an event belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentInfo {
    pub target: ProjectTarget,
    pub project_name: String,
    pub remote_name: String,
    /// Full reupload requested
    pub install: bool,
    pub started_at: Option<DateTime<Utc>>,
}

/// Event emitted during a deployment
///
/// Bucket events come in start/item/end triples; a bucket with no entries
/// emits nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// Transaction began
    Started(DeploymentInfo),

    /// Remote marker already equals the newest revision
    UpToDate(DeploymentInfo),

    /// Delta computed, nothing transferred yet
    Stat {
        deployment: DeploymentInfo,
        changes: FileChangeSet,
    },

    AddStart,
    Added { path: RepoPath },
    AddEnd,

    ModifiedStart,
    Modified { path: RepoPath },
    ModifiedEnd,

    CopiedStart,
    Copied { source: RepoPath },
    CopiedEnd,

    RenamedStart,
    Renamed {
        source: RepoPath,
        destination: RepoPath,
    },
    RenamedEnd,

    DeletedStart,
    Deleted { path: RepoPath },
    DeletedEnd,

    /// Transaction finalized (fires exactly once)
    Ended(DeploymentInfo),
}

impl DeployEvent {
    /// Opening event of a bucket
    pub fn bucket_start(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Added => DeployEvent::AddStart,
            Bucket::Modified => DeployEvent::ModifiedStart,
            Bucket::Copied => DeployEvent::CopiedStart,
            Bucket::Renamed => DeployEvent::RenamedStart,
            Bucket::Deleted => DeployEvent::DeletedStart,
        }
    }

    /// Closing event of a bucket
    pub fn bucket_end(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Added => DeployEvent::AddEnd,
            Bucket::Modified => DeployEvent::ModifiedEnd,
            Bucket::Copied => DeployEvent::CopiedEnd,
            Bucket::Renamed => DeployEvent::RenamedEnd,
            Bucket::Deleted => DeployEvent::DeletedEnd,
        }
    }

    /// Stable snake_case name of the event
    pub fn name(&self) -> &'static str {
        match self {
            DeployEvent::Started(_) => "start",
            DeployEvent::UpToDate(_) => "up_to_date",
            DeployEvent::Stat { .. } => "stat",
            DeployEvent::AddStart => "add_start",
            DeployEvent::Added { .. } => "add",
            DeployEvent::AddEnd => "add_end",
            DeployEvent::ModifiedStart => "modified_start",
            DeployEvent::Modified { .. } => "modified",
            DeployEvent::ModifiedEnd => "modified_end",
            DeployEvent::CopiedStart => "copied_start",
            DeployEvent::Copied { .. } => "copied",
            DeployEvent::CopiedEnd => "copied_end",
            DeployEvent::RenamedStart => "renamed_start",
            DeployEvent::Renamed { .. } => "renamed",
            DeployEvent::RenamedEnd => "renamed_end",
            DeployEvent::DeletedStart => "deleted_start",
            DeployEvent::Deleted { .. } => "deleted",
            DeployEvent::DeletedEnd => "deleted_end",
            DeployEvent::Ended(_) => "end",
        }
    }

    /// Per-file events, which summary-only observers skip
    pub fn is_detailed(&self) -> bool {
        matches!(
            self,
            DeployEvent::Added { .. }
                | DeployEvent::Modified { .. }
                | DeployEvent::Copied { .. }
                | DeployEvent::Renamed { .. }
                | DeployEvent::Deleted { .. }
        )
    }
}

/// Trait for receiving deployment events
///
/// Implementations match on the events they care about and ignore the rest:
/// - `ConsoleObserver`: Progress display in terminal
/// - `JsonObserver`: NDJSON event stream for CI
/// - `TracingObserver`: Structured log records
pub trait DeploymentObserver: Send + Sync {
    /// Handle a deployment event
    fn on_event(&self, event: &DeployEvent);

    /// Check if this observer wants per-file events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op observer for silent operation
pub struct NoopObserver;

impl DeploymentObserver for NoopObserver {
    fn on_event(&self, _event: &DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
