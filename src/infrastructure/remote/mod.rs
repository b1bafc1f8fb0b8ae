//! Remote store backends
//!
//! - `memory` - In-process store (test double, dry runs)
//! - `local` - A directory on this machine
//! - `ssh` - A directory on a host reachable over ssh
//! - `registry` - Adapter name to factory mapping used by the configuration

mod local;
mod memory;
mod registry;
mod ssh;

pub use local::{LocalDirStore, LOCK_FILE};
pub use memory::{MemoryStore, StoreCall};
pub use registry::{RemoteStoreRegistry, StoreFactory};
pub use ssh::{SshStore, DEFAULT_CONNECT_TIMEOUT};
