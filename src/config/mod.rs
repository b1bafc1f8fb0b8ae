//! Configuration for revdeploy
//!
//! A single TOML file (`revdeploy.toml`) lists projects and their remotes.
//! The path comes from, in order:
//! 1. `--config` on the command line
//! 2. `REVDEPLOY_CONFIG`
//! 3. `revdeploy.toml` in the working directory

mod loader;
mod types;

pub use loader::{
    load_with_warnings, parse_with_warnings, resolve_config_path, ConfigError, ConfigWarning,
    CONFIG_ENV, DEFAULT_CONFIG_FILE,
};
pub use types::{
    Config, LocalSettings, ProjectConfig, RemoteConfig, SshSettings, DEFAULT_MARKER,
};
