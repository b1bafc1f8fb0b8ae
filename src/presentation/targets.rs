//! Target selection from command-line selectors
//!
//! A selector is a project/remote name, or its zero-based position in the
//! config file when no entry has that name.

use thiserror::Error;

use crate::config::{Config, ProjectConfig};
use crate::domain::value_objects::ProjectTarget;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no project '{0}' in the configuration")]
    UnknownProject(String),

    #[error("project '{project}' has no remote '{remote}'")]
    UnknownRemote { project: String, remote: String },

    #[error("no configured project has a remote '{0}'")]
    NoMatchingRemote(String),
}

fn find<T>(items: &[T], name_of: impl Fn(&T) -> &str, selector: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| name_of(item) == selector)
        .or_else(|| {
            selector
                .parse::<usize>()
                .ok()
                .filter(|index| *index < items.len())
        })
}

/// Indices of the selected projects, all of them when `selector` is `None`
pub fn select_projects(config: &Config, selector: Option<&str>) -> Result<Vec<usize>, SelectionError> {
    match selector {
        None => Ok((0..config.projects.len()).collect()),
        Some(selector) => find(&config.projects, |p| p.name.as_str(), selector)
            .map(|index| vec![index])
            .ok_or_else(|| SelectionError::UnknownProject(selector.to_string())),
    }
}

fn select_remotes(project: &ProjectConfig, selector: Option<&str>) -> Option<Vec<usize>> {
    match selector {
        None => Some((0..project.remotes.len()).collect()),
        Some(selector) => find(&project.remotes, |r| r.name.as_str(), selector).map(|i| vec![i]),
    }
}

/// Every (project, remote) pair the selectors address, in config order
///
/// A remote selector without a project selector picks that remote in every
/// project that has one.
pub fn select_targets(
    config: &Config,
    project: Option<&str>,
    remote: Option<&str>,
    branch: Option<&str>,
) -> Result<Vec<ProjectTarget>, SelectionError> {
    let mut targets = Vec::new();
    for project_index in select_projects(config, project)? {
        let project_config = &config.projects[project_index];
        let Some(remotes) = select_remotes(project_config, remote) else {
            if project.is_some() {
                return Err(SelectionError::UnknownRemote {
                    project: project_config.name.clone(),
                    remote: remote.unwrap_or_default().to_string(),
                });
            }
            continue;
        };
        for remote_index in remotes {
            let mut target = ProjectTarget::new(project_index, remote_index);
            target.branch = branch.map(str::to_string);
            targets.push(target);
        }
    }

    if let (None, Some(remote)) = (project, remote) {
        if targets.is_empty() {
            return Err(SelectionError::NoMatchingRemote(remote.to_string()));
        }
    }
    Ok(targets)
}
