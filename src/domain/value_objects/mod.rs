//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod path;
mod revision;
mod target;

pub use path::{PathError, RepoPath};
pub use revision::RevisionId;
pub use target::{ProjectTarget, TargetRef};
