//! Workspace - the registry of projects and their remotes
//!
//! Owns every revision source and remote store. Deployments borrow from it
//! for the duration of one run.

use crate::domain::ports::{RemoteStore, RevisionSource};
use crate::domain::value_objects::{ProjectTarget, TargetRef};
use crate::error::{DeployError, DeployResult};

/// A named remote store
pub struct Remote {
    name: String,
    store: Box<dyn RemoteStore>,
}

impl Remote {
    pub fn new(name: impl Into<String>, store: Box<dyn RemoteStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &dyn RemoteStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn RemoteStore {
        self.store.as_mut()
    }
}

/// A repository together with the remotes it deploys to
pub struct Project {
    name: String,
    source: Box<dyn RevisionSource>,
    remotes: Vec<Remote>,
}

impl Project {
    pub fn new(name: impl Into<String>, source: Box<dyn RevisionSource>) -> Self {
        Self {
            name: name.into(),
            source,
            remotes: Vec::new(),
        }
    }

    pub fn with_remote(mut self, name: impl Into<String>, store: Box<dyn RemoteStore>) -> Self {
        self.remotes.push(Remote::new(name, store));
        self
    }

    pub fn add_remote(&mut self, remote: Remote) {
        self.remotes.push(remote);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &dyn RevisionSource {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut dyn RevisionSource {
        self.source.as_mut()
    }

    pub fn remotes(&self) -> &[Remote] {
        &self.remotes
    }

    pub fn remote(&self, index: usize) -> Option<&Remote> {
        self.remotes.get(index)
    }

    pub fn remotes_mut(&mut self) -> &mut [Remote] {
        &mut self.remotes
    }
}

/// Source and store a target resolved to, borrowed from the workspace
pub struct ResolvedTarget<'a> {
    pub project_name: &'a str,
    pub remote_name: &'a str,
    pub source: &'a mut dyn RevisionSource,
    pub store: &'a mut dyn RemoteStore,
}

/// All configured projects
#[derive(Default)]
pub struct Workspace {
    projects: Vec<Project>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut [Project] {
        &mut self.projects
    }

    pub fn project(&self, index: usize) -> Option<&Project> {
        self.projects.get(index)
    }

    pub fn project_mut(&mut self, index: usize) -> Option<&mut Project> {
        self.projects.get_mut(index)
    }

    /// Check that the target's project and remote indices exist
    pub fn validate(&self, target: &ProjectTarget) -> DeployResult<()> {
        let project = self
            .project(target.project)
            .ok_or(DeployError::UnresolvedTarget(TargetRef::Project(
                target.project,
            )))?;
        if project.remote(target.remote).is_none() {
            return Err(DeployError::UnresolvedTarget(TargetRef::Remote {
                project: target.project,
                remote: target.remote,
            }));
        }
        Ok(())
    }

    /// Borrow the source and store a target addresses
    pub fn resolve(&mut self, target: &ProjectTarget) -> DeployResult<ResolvedTarget<'_>> {
        self.validate(target)?;
        let Project {
            name,
            source,
            remotes,
        } = &mut self.projects[target.project];
        let remote = &mut remotes[target.remote];

        Ok(ResolvedTarget {
            project_name: name.as_str(),
            remote_name: remote.name.as_str(),
            source: source.as_mut(),
            store: remote.store.as_mut(),
        })
    }
}
