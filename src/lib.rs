//! revdeploy - incremental deployment of version-controlled repositories
//!
//! revdeploy remembers which revision each remote holds (a small marker file
//! on the remote), asks the repository what changed since then, and replays
//! only those changes: uploads, server-side copies and renames, deletions.
//! A remote without a marker receives a full install.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    DeployMode, DeployOutcome, DeployReport, DeployState, Deployment, Project, Remote,
    RemoteStatus, Workspace,
};
pub use config::{Config, ConfigError, ConfigWarning};
pub use domain::entities::{Branch, Bucket, ChangeStats, FileChangeSet, PathPair};
pub use domain::ports::{
    DeployEvent, DeploymentInfo, DeploymentObserver, RemoteStore, RevisionSource,
};
pub use domain::value_objects::{ProjectTarget, RepoPath, RevisionId, TargetRef};
pub use error::{DeployError, DeployResult};
