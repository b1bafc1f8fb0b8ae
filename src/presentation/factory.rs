//! Workspace Factory
//!
//! Builds a `Workspace` from configuration with infrastructure wired up.
//! This is the dependency injection point for the application.

use tracing::debug;

use crate::application::{Project, Remote, Workspace};
use crate::config::{Config, ConfigError};
use crate::infrastructure::{GitRevisionSource, RemoteStoreRegistry};

impl Workspace {
    /// One git source per project, one registry-built store per remote
    pub fn from_config(config: &Config, registry: &RemoteStoreRegistry) -> Result<Self, ConfigError> {
        let mut workspace = Workspace::new();
        for project_config in &config.projects {
            let source = GitRevisionSource::new(&project_config.path)
                .with_branch_listing(project_config.list_branches);
            let mut project = Project::new(&project_config.name, Box::new(source));

            for remote_config in &project_config.remotes {
                let store = registry.build(remote_config)?;
                debug!(
                    project = %project_config.name,
                    remote = %remote_config.name,
                    store = %store.display_name(),
                    "remote configured"
                );
                project.add_remote(Remote::new(&remote_config.name, store));
            }
            workspace.add_project(project);
        }
        Ok(workspace)
    }
}

/// Workspace for a config file using the built-in store adapters
pub fn create_workspace(config: &Config) -> Result<Workspace, ConfigError> {
    Workspace::from_config(config, &RemoteStoreRegistry::with_defaults())
}
