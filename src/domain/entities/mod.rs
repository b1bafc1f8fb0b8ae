//! Domain Entities
//!
//! - `FileChangeSet` - Classified delta between two revisions
//! - `Branch` - A branch reported by a revision source

mod branch;
mod change_set;

pub use branch::Branch;
pub use change_set::{Bucket, ChangeStats, FileChangeSet, PathPair};
