//! Application Layer
//!
//! Orchestrates the domain ports into deployment runs.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT perform I/O itself; sources and stores are injected
//!
//! ## Components
//!
//! - `Workspace` - Owns projects, their revision sources and remote stores
//! - `Deployment` - One deployment transaction against a project target
//! - `remote_status` - Read-only marker comparison

pub mod deploy;
pub mod status;
pub mod workspace;

pub use deploy::{DeployMode, DeployOutcome, DeployReport, DeployState, Deployment};
pub use status::{remote_status, RemoteStatus};
pub use workspace::{Project, Remote, ResolvedTarget, Workspace};
