//! Revision Source Port
//!
//! Abstracts the version-control repository a deployment reads from.
//! The git command-line implementation lives in `infrastructure::git`.

use std::io::Read;

use chrono::{DateTime, Utc};

use crate::domain::entities::{Branch, FileChangeSet};
use crate::domain::services::ClassifyError;
use crate::domain::value_objects::{RepoPath, RevisionId};

/// Result type for revision source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Revision source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backend could not be invoked or produced unparseable output
    #[error("version control backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Path is not tracked at the requested revision
    #[error("'{path}' is not tracked at {}", describe_revision(.revision))]
    FileNotFound {
        path: RepoPath,
        revision: Option<RevisionId>,
    },
}

fn describe_revision(revision: &Option<RevisionId>) -> &str {
    revision
        .as_ref()
        .map(|r| r.short())
        .unwrap_or("an empty history")
}

impl From<ClassifyError> for SourceError {
    fn from(err: ClassifyError) -> Self {
        SourceError::BackendUnavailable(format!("unparseable diff output: {}", err))
    }
}

/// A version-controlled repository
///
/// Revision ids come from one ancestry query (newest first) that
/// implementations compute once and cache until [`RevisionSource::reset`] or
/// [`RevisionSource::select_branch`] is called. An empty history yields `None`
/// for both ends.
pub trait RevisionSource {
    /// Human-readable location of the repository
    fn display_name(&self) -> String;

    /// Deploy from this branch's tip instead of `HEAD` (`None` restores `HEAD`)
    ///
    /// Always clears the revision cache.
    fn select_branch(&mut self, branch: Option<&str>);

    /// Drop cached revision ids so the next query hits the backend again
    fn reset(&mut self);

    /// First element of the ancestry list
    fn newest_revision(&self) -> SourceResult<Option<RevisionId>>;

    /// Last element of the ancestry list
    fn oldest_revision(&self) -> SourceResult<Option<RevisionId>>;

    /// Classified changes between two revisions
    ///
    /// Returns an empty change set when `from == to`.
    fn changes_since(&self, from: &RevisionId, to: &RevisionId) -> SourceResult<FileChangeSet>;

    /// Every file tracked at the newest revision, as an install change set
    fn all_tracked_files(&self) -> SourceResult<FileChangeSet>;

    /// Content of a tracked file at the newest revision
    fn open_file(&self, path: &RepoPath) -> SourceResult<Box<dyn Read>>;

    /// Author of the most recent commit
    fn owner(&self) -> SourceResult<Option<String>>;

    /// Timestamp of the most recent commit
    fn last_change_timestamp(&self) -> SourceResult<Option<DateTime<Utc>>>;

    /// Branches, with at most one marked as default
    fn branches(&self) -> SourceResult<Vec<Branch>>;
}
