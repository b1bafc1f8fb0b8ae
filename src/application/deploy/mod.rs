//! Deploy Module
//!
//! Runs one deployment transaction: resolve the target, diff the source
//! against the remote marker, transfer the buckets, write the new marker.
//!
//! ## Structure
//!
//! - `deployment` - The transaction state machine (`Deployment`)
//! - `result` - Outcome types (`DeployOutcome`, `DeployReport`)
//!
//! ## Usage
//!
//! ```ignore
//! use revdeploy::application::deploy::Deployment;
//!
//! let mut deployment = Deployment::new(&mut workspace);
//! deployment.set_remote_id(1)?;
//! deployment.add_observer(Arc::new(ConsoleObserver::stderr(false)));
//! let outcome = deployment.start()?;
//! ```

mod deployment;
mod result;

pub use deployment::{DeployState, Deployment};
pub use result::{DeployMode, DeployOutcome, DeployReport};
