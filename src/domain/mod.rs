//! Domain Layer
//!
//! The deployment delta model - pure types and logic without I/O.
//!
//! ## Structure
//!
//! - `entities/` - Change sets and branches
//! - `value_objects/` - Revision ids, repository paths, targets
//! - `services/` - The delta classifier
//! - `ports/` - Revision source, remote store and observer interfaces

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
