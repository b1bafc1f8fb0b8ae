//! Error types for revdeploy
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use thiserror::Error;

use crate::domain::ports::{SourceError, StoreError, StoreOperation};
use crate::domain::value_objects::{RepoPath, RevisionId, TargetRef};

/// Result type alias for deployment operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors surfaced to the caller of a deployment
#[derive(Error, Debug)]
pub enum DeployError {
    /// Project, branch or remote does not exist in the workspace
    #[error("unresolved target: {0}")]
    UnresolvedTarget(TargetRef),

    /// The version-control backend could not be invoked or returned garbage
    #[error("version control backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A path listed for transfer is missing at the reported revision
    #[error("file not found in revision source: {path}")]
    FileNotFound {
        path: RepoPath,
        revision: Option<RevisionId>,
    },

    /// Remote store connection failed
    #[error("remote unreachable: {0}")]
    RemoteUnreachable(String),

    /// Remote store rejected credentials
    #[error("remote authentication failed: {0}")]
    RemoteAuthFailed(String),

    /// A file operation on the remote failed; remaining buckets were skipped
    #[error("{operation} failed for '{path}': {message}")]
    Transfer {
        operation: StoreOperation,
        path: String,
        message: String,
    },

    /// The deployment already ran; each run needs a fresh deployment
    #[error("deployment already started; create a new deployment for another run")]
    AlreadyRun,
}

impl From<SourceError> for DeployError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::BackendUnavailable(message) => DeployError::BackendUnavailable(message),
            SourceError::FileNotFound { path, revision } => {
                DeployError::FileNotFound { path, revision }
            }
        }
    }
}

impl From<StoreError> for DeployError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unreachable(message) => DeployError::RemoteUnreachable(message),
            StoreError::AuthFailed(message) => DeployError::RemoteAuthFailed(message),
            StoreError::Transfer {
                operation,
                path,
                message,
            } => DeployError::Transfer {
                operation,
                path,
                message,
            },
        }
    }
}
