//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod classifier;

pub use classifier::{classify, classify_entries, ClassifyError};
