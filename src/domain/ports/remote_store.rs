//! Remote Store Port
//!
//! Abstracts the deployment target: a file store addressed by
//! repository-relative paths plus one small marker recording the deployed
//! revision. Backends live in `infrastructure::remote`.

use std::fmt;
use std::io::Read;

use crate::domain::value_objects::{RepoPath, RevisionId};

/// Result type for remote store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// File operation that failed on the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    ReadMarker,
    WriteMarker,
    Put,
    Copy,
    Rename,
    Unlink,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOperation::ReadMarker => "read marker",
            StoreOperation::WriteMarker => "write marker",
            StoreOperation::Put => "put",
            StoreOperation::Copy => "copy",
            StoreOperation::Rename => "rename",
            StoreOperation::Unlink => "unlink",
        };
        f.write_str(name)
    }
}

/// Remote store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Connection could not be established (or timed out)
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// Credentials were rejected
    #[error("remote authentication failed: {0}")]
    AuthFailed(String),

    /// A single file operation failed
    #[error("{operation} failed for '{path}': {message}")]
    Transfer {
        operation: StoreOperation,
        path: String,
        message: String,
    },
}

impl StoreError {
    pub fn transfer(
        operation: StoreOperation,
        path: impl fmt::Display,
        message: impl fmt::Display,
    ) -> Self {
        StoreError::Transfer {
            operation,
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

/// A remote file store
///
/// Contract shared by every backend:
/// - `init` runs once before anything else
/// - `put` creates missing parent directories and overwrites
/// - `copy` from a missing source is a no-op
/// - `unlink` of a missing path is a no-op
/// - `rename` and `unlink` remove parent directories left empty, up to but
///   not including the store root
/// - `put_marker` is atomic from a reader's point of view
/// - `clean_up` is safe to call repeatedly, and without a prior `init`
pub trait RemoteStore {
    /// Human-readable location of the store
    fn display_name(&self) -> String;

    /// Establish the connection/session
    fn init(&mut self) -> StoreResult<()>;

    /// The deployed revision, or `None` if nothing was deployed yet
    fn get_marker(&mut self) -> StoreResult<Option<RevisionId>>;

    /// Record the deployed revision
    fn put_marker(&mut self, revision: &RevisionId) -> StoreResult<()>;

    /// Write content to a path
    fn put(&mut self, content: &mut dyn Read, destination: &RepoPath) -> StoreResult<()>;

    /// Copy a path
    fn copy(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()>;

    /// Move a path
    fn rename(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()>;

    /// Delete a path
    fn unlink(&mut self, path: &RepoPath) -> StoreResult<()>;

    /// Release session resources
    fn clean_up(&mut self);
}
