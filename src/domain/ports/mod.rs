//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod remote_store;
pub mod revision_source;

pub use deploy_events::{DeployEvent, DeploymentInfo, DeploymentObserver, NoopObserver};
pub use remote_store::{RemoteStore, StoreError, StoreOperation, StoreResult};
pub use revision_source::{RevisionSource, SourceError, SourceResult};
