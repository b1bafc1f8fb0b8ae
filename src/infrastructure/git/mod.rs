//! Git revision source
//!
//! - `command` - `git` process runner
//! - `source` - `GitRevisionSource`

mod command;
mod source;

pub use command::Git;
pub use source::{parse_raw_timestamp, GitRevisionSource};
