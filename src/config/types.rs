//! Configuration type definitions

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{PathError, RepoPath};

use super::loader::{self, ConfigError, ConfigWarning};

/// Default marker file, relative to the remote root
pub const DEFAULT_MARKER: &str = ".revision";

/// Root of `revdeploy.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectConfig>,
}

/// One repository and the remotes it deploys to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,

    /// Path to the git repository
    pub path: PathBuf,

    /// When false, branch listing yields a single synthetic `master`
    #[serde(default = "default_true")]
    pub list_branches: bool,

    #[serde(default, rename = "remote")]
    pub remotes: Vec<RemoteConfig>,
}

/// One deployment destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub name: String,

    /// Registry key of the store backend (`local`, `ssh`, `memory`)
    pub adapter: String,

    /// Marker path relative to the remote root
    #[serde(default = "default_marker")]
    pub marker: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalSettings>,
}

/// Settings for the `ssh` adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshSettings {
    /// `user@host` or a host alias from `~/.ssh/config`
    pub destination: String,

    /// Directory on the remote host
    pub root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Seconds before a connection attempt is abandoned
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Settings for the `local` adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSettings {
    pub root: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_connect_timeout() -> u64 {
    crate::infrastructure::remote::DEFAULT_CONNECT_TIMEOUT
}

impl RemoteConfig {
    /// The marker as a validated repository path
    pub fn marker_path(&self) -> Result<RepoPath, PathError> {
        RepoPath::new(&self.marker)
    }
}

impl ProjectConfig {
    pub fn remote(&self, name: &str) -> Option<(usize, &RemoteConfig)> {
        self.remotes.iter().enumerate().find(|(_, r)| r.name == name)
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load, validate and collect non-fatal warnings (e.g. unknown keys)
    pub fn load_with_warnings(path: &Path) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_with_warnings(path)
    }

    /// Find a project by name
    pub fn project(&self, name: &str) -> Option<(usize, &ProjectConfig)> {
        self.projects.iter().enumerate().find(|(_, p)| p.name == name)
    }

    /// Structural checks that do not depend on the store registry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projects.is_empty() {
            return Err(ConfigError::NoProjects);
        }

        let mut project_names = HashSet::new();
        for project in &self.projects {
            if !project_names.insert(project.name.as_str()) {
                return Err(ConfigError::DuplicateProject(project.name.clone()));
            }

            let mut remote_names = HashSet::new();
            for remote in &project.remotes {
                if !remote_names.insert(remote.name.as_str()) {
                    return Err(ConfigError::DuplicateRemote {
                        project: project.name.clone(),
                        remote: remote.name.clone(),
                    });
                }
                remote
                    .marker_path()
                    .map_err(|source| ConfigError::InvalidMarker {
                        remote: remote.name.clone(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}
