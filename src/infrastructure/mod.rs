//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `git/` - Revision source over the `git` command line
//! - `remote/` - Remote stores (memory, local directory, ssh) and their registry
//! - `observers/` - Deployment observers (console, JSON, tracing)

pub mod git;
pub mod observers;
pub mod remote;

// Re-export for convenience
pub use git::GitRevisionSource;
pub use observers::{ConsoleObserver, JsonObserver, TracingObserver};
pub use remote::{LocalDirStore, MemoryStore, RemoteStoreRegistry, SshStore};
