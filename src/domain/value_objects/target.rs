//! Project target value object - which repository, branch and remote a run addresses

use std::fmt;

/// One (repository, branch, remote) triple
///
/// Indices address the workspace's project list and that project's remote
/// list. `branch == None` deploys whatever the repository's `HEAD` points at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectTarget {
    pub project: usize,
    pub branch: Option<String>,
    pub remote: usize,
}

impl ProjectTarget {
    pub fn new(project: usize, remote: usize) -> Self {
        Self {
            project,
            branch: None,
            remote,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

impl fmt::Display for ProjectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(
                f,
                "project #{} ({}) -> remote #{}",
                self.project, branch, self.remote
            ),
            None => write!(f, "project #{} -> remote #{}", self.project, self.remote),
        }
    }
}

/// Which part of a target failed to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    Project(usize),
    Remote { project: usize, remote: usize },
    Branch { project: usize, name: String },
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Project(index) => write!(f, "no project at index {}", index),
            TargetRef::Remote { project, remote } => {
                write!(f, "project #{} has no remote at index {}", project, remote)
            }
            TargetRef::Branch { project, name } => {
                write!(f, "project #{} has no branch '{}'", project, name)
            }
        }
    }
}
