//! Deploy Result
//!
//! Outcome types for a deployment run.

use std::fmt;

use crate::domain::entities::ChangeStats;
use crate::domain::value_objects::RevisionId;

/// Whether the run uploaded everything or only a delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    /// Every tracked file treated as added
    Install,
    /// Only changes since the remote marker
    Update,
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployMode::Install => f.write_str("install"),
            DeployMode::Update => f.write_str("update"),
        }
    }
}

/// Report of a run that transferred a change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub mode: DeployMode,
    /// Marker for updates; oldest revision for installs
    pub baseline: Option<RevisionId>,
    /// Newest revision, written as the new marker (absent for empty histories)
    pub deployed: Option<RevisionId>,
    pub stats: ChangeStats,
}

impl DeployReport {
    pub fn has_changes(&self) -> bool {
        self.stats.total() > 0
    }
}

/// Result of a successful `start()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Remote marker already matched the newest revision
    UpToDate { revision: RevisionId },
    Deployed(DeployReport),
}

impl DeployOutcome {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, DeployOutcome::UpToDate { .. })
    }

    pub fn report(&self) -> Option<&DeployReport> {
        match self {
            DeployOutcome::Deployed(report) => Some(report),
            DeployOutcome::UpToDate { .. } => None,
        }
    }
}
