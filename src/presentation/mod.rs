//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Building the workspace from configuration
//! - Mapping command-line selectors to deployment targets
//!
//! ## Structure
//!
//! - `cli` - clap definitions shared by the binary and its tests
//! - `factory` - Creates the workspace with proper dependencies (dependency injection)
//! - `targets` - Project/remote selectors
//!
//! ## Usage
//!
//! ```ignore
//! use revdeploy::presentation::{create_workspace, select_targets};
//!
//! let workspace = create_workspace(&config)?;
//! let targets = select_targets(&config, Some("site"), None, None)?;
//! ```

pub mod cli;
pub mod factory;
pub mod targets;

pub use factory::create_workspace;
pub use targets::{select_projects, select_targets, SelectionError};
