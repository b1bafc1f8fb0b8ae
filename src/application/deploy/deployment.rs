//! Deployment - one deployment transaction
//!
//! Drives a revision source and a remote store through:
//!
//! `Idle -> Resolving -> Diffing -> {UpToDate | Transferring} -> Finalizing -> Done`
//!
//! Buckets are applied in the fixed order added, modified, copied, renamed,
//! deleted. The marker is written only after every bucket succeeded, so a
//! failed run leaves the old marker and the next run re-diffs from it.
//!
//! `end()` fires the `Ended` event exactly once, whether called explicitly,
//! reached through a successful `start()`, or triggered by dropping the
//! deployment.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::application::workspace::Workspace;
use crate::domain::entities::{Bucket, FileChangeSet};
use crate::domain::ports::{
    DeployEvent, DeploymentInfo, DeploymentObserver, RemoteStore, RevisionSource,
};
use crate::domain::value_objects::{ProjectTarget, RepoPath, TargetRef};
use crate::error::{DeployError, DeployResult};

use super::result::{DeployMode, DeployOutcome, DeployReport};

/// Lifecycle state of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Idle,
    Resolving,
    Diffing,
    UpToDate,
    Transferring,
    Finalizing,
    Done,
    Failed,
}

/// A single deployment run against one project target
///
/// Borrows its source and store from the workspace; owns its observers.
/// A deployment runs at most once.
pub struct Deployment<'w> {
    workspace: &'w mut Workspace,
    target: ProjectTarget,
    install: bool,
    started_at: Option<DateTime<Utc>>,
    observers: Vec<Arc<dyn DeploymentObserver>>,
    state: DeployState,
    ended: bool,
}

impl<'w> Deployment<'w> {
    /// Bind a deployment to the first project and its first remote
    pub fn new(workspace: &'w mut Workspace) -> Self {
        Self {
            workspace,
            target: ProjectTarget::default(),
            install: false,
            started_at: None,
            observers: Vec::new(),
            state: DeployState::Idle,
            ended: false,
        }
    }

    /// Bind to an explicit target, validating project and remote indices
    pub fn for_target(workspace: &'w mut Workspace, target: ProjectTarget) -> DeployResult<Self> {
        let mut deployment = Self::new(workspace);
        deployment.set_project_id(target.project)?;
        deployment.set_remote_id(target.remote)?;
        if let Some(branch) = target.branch {
            deployment.set_branch(branch)?;
        }
        Ok(deployment)
    }

    pub fn target(&self) -> &ProjectTarget {
        &self.target
    }

    pub fn state(&self) -> DeployState {
        self.state
    }

    pub fn install(&self) -> bool {
        self.install
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Select the project; clears any branch chosen for the previous one
    pub fn set_project_id(&mut self, project: usize) -> DeployResult<()> {
        self.ensure_idle()?;
        if self.workspace.project(project).is_none() {
            return Err(DeployError::UnresolvedTarget(TargetRef::Project(project)));
        }
        self.target.project = project;
        self.target.branch = None;
        Ok(())
    }

    /// Select a remote of the current project
    pub fn set_remote_id(&mut self, remote: usize) -> DeployResult<()> {
        self.ensure_idle()?;
        let candidate = ProjectTarget {
            remote,
            ..self.target.clone()
        };
        self.workspace.validate(&candidate)?;
        self.target = candidate;
        Ok(())
    }

    /// Select a branch of the current project
    pub fn set_branch(&mut self, branch: impl Into<String>) -> DeployResult<()> {
        self.ensure_idle()?;
        let branch = branch.into();
        let project_index = self.target.project;
        let project = self
            .workspace
            .project(project_index)
            .ok_or(DeployError::UnresolvedTarget(TargetRef::Project(
                project_index,
            )))?;

        let known = project.source().branches()?;
        if !known.iter().any(|b| b.name == branch) {
            return Err(DeployError::UnresolvedTarget(TargetRef::Branch {
                project: project_index,
                name: branch,
            }));
        }
        self.target.branch = Some(branch);
        Ok(())
    }

    /// Force a full reupload regardless of the remote marker
    pub fn set_install(&mut self, install: bool) {
        self.install = install;
    }

    /// Register an observer (duplicates allowed)
    pub fn add_observer(&mut self, observer: Arc<dyn DeploymentObserver>) {
        self.observers.push(observer);
    }

    /// Unregister one registration of this exact observer instance
    ///
    /// Returns false when the instance is not registered.
    pub fn remove_observer(&mut self, observer: &Arc<dyn DeploymentObserver>) -> bool {
        let position = self
            .observers
            .iter()
            .position(|registered| same_instance(registered, observer));
        match position {
            Some(idx) => {
                self.observers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Snapshot of this deployment, as carried by lifecycle events
    pub fn info(&self) -> DeploymentInfo {
        let project = self.workspace.project(self.target.project);
        DeploymentInfo {
            target: self.target.clone(),
            project_name: project.map(|p| p.name().to_string()).unwrap_or_default(),
            remote_name: project
                .and_then(|p| p.remote(self.target.remote))
                .map(|r| r.name().to_string())
                .unwrap_or_default(),
            install: self.install,
            started_at: self.started_at,
        }
    }

    /// Run the transaction to completion
    ///
    /// On success the deployment is finalized (`Ended` fired). On error it is
    /// left in `Failed`; the caller's `end()` or drop finalizes it.
    pub fn start(&mut self) -> DeployResult<DeployOutcome> {
        if self.state != DeployState::Idle || self.ended {
            return Err(DeployError::AlreadyRun);
        }
        self.state = DeployState::Resolving;
        self.started_at = Some(Utc::now());

        let result = self.run();
        match &result {
            Ok(outcome) => {
                self.state = DeployState::Done;
                info!(target = %self.target, up_to_date = outcome.is_up_to_date(), "deployment finished");
                self.end();
            }
            Err(err) => {
                self.state = DeployState::Failed;
                warn!(target = %self.target, error = %err, "deployment failed");
            }
        }
        result
    }

    /// Finalize the transaction; fires `Ended` once, later calls are no-ops
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let info = self.info();
        emit(&self.observers, DeployEvent::Ended(info));
    }

    fn ensure_idle(&self) -> DeployResult<()> {
        if self.state == DeployState::Idle && !self.ended {
            Ok(())
        } else {
            Err(DeployError::AlreadyRun)
        }
    }

    fn run(&mut self) -> DeployResult<DeployOutcome> {
        let info = self.info();
        let Self {
            workspace,
            target,
            install,
            observers,
            state,
            ..
        } = self;

        let resolved = workspace.resolve(target)?;
        info!(
            project = resolved.project_name,
            remote = resolved.remote_name,
            source = %resolved.source.display_name(),
            store = %resolved.store.display_name(),
            install = *install,
            "starting deployment"
        );
        emit(observers, DeployEvent::Started(info.clone()));

        let mut run = DeployRun {
            source: resolved.source,
            store: resolved.store,
            observers: observers.as_slice(),
            state,
            info,
        };
        run.execute(*install, target.branch.as_deref())
    }
}

impl Drop for Deployment<'_> {
    fn drop(&mut self) {
        self.end();
    }
}

/// Compare observer registrations by allocation, not by value
fn same_instance(a: &Arc<dyn DeploymentObserver>, b: &Arc<dyn DeploymentObserver>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

fn emit(observers: &[Arc<dyn DeploymentObserver>], event: DeployEvent) {
    let detailed = event.is_detailed();
    for observer in observers {
        if detailed && !observer.wants_detailed_events() {
            continue;
        }
        observer.on_event(&event);
    }
}

/// Borrowed pieces of one deployment while it executes
struct DeployRun<'a> {
    source: &'a mut dyn RevisionSource,
    store: &'a mut dyn RemoteStore,
    observers: &'a [Arc<dyn DeploymentObserver>],
    state: &'a mut DeployState,
    info: DeploymentInfo,
}

impl DeployRun<'_> {
    fn execute(&mut self, install: bool, branch: Option<&str>) -> DeployResult<DeployOutcome> {
        self.source.select_branch(branch);

        let result = match self.store.init() {
            Ok(()) => self.deploy(install),
            Err(err) => Err(err.into()),
        };
        self.store.clean_up();
        result
    }

    fn deploy(&mut self, install: bool) -> DeployResult<DeployOutcome> {
        *self.state = DeployState::Diffing;
        let newest = self.source.newest_revision()?;
        let marker = self.store.get_marker()?;
        debug!(
            newest = ?newest.as_ref().map(|r| r.as_str()),
            marker = ?marker.as_ref().map(|r| r.as_str()),
            "resolved revisions"
        );

        if !install {
            if let (Some(marker), Some(newest)) = (&marker, &newest) {
                if marker == newest {
                    *self.state = DeployState::UpToDate;
                    emit(self.observers, DeployEvent::UpToDate(self.info.clone()));
                    *self.state = DeployState::Finalizing;
                    return Ok(DeployOutcome::UpToDate {
                        revision: newest.clone(),
                    });
                }
            }
        }

        let (mode, baseline, changes) = match (marker, install) {
            (Some(marker), false) => {
                let changes = match &newest {
                    Some(newest) => self.source.changes_since(&marker, newest)?,
                    None => {
                        warn!(marker = %marker, "source has no revisions but remote has a marker");
                        FileChangeSet::new()
                    }
                };
                (DeployMode::Update, Some(marker), changes)
            }
            _ => {
                let baseline = self.source.oldest_revision()?;
                (DeployMode::Install, baseline, self.source.all_tracked_files()?)
            }
        };

        let stats = changes.stats();
        info!(mode = %mode, %stats, "computed delta");
        emit(
            self.observers,
            DeployEvent::Stat {
                deployment: self.info.clone(),
                changes: changes.clone(),
            },
        );

        *self.state = DeployState::Transferring;
        self.transfer(&changes)?;

        *self.state = DeployState::Finalizing;
        if let Some(newest) = &newest {
            self.store.put_marker(newest)?;
        }

        Ok(DeployOutcome::Deployed(DeployReport {
            mode,
            baseline,
            deployed: newest,
            stats,
        }))
    }

    fn transfer(&mut self, changes: &FileChangeSet) -> DeployResult<()> {
        for bucket in Bucket::TRANSFER_ORDER {
            if changes.count(bucket) == 0 {
                continue;
            }
            emit(self.observers, DeployEvent::bucket_start(bucket));

            match bucket {
                Bucket::Added => {
                    for path in &changes.added {
                        self.upload(path)?;
                        emit(self.observers, DeployEvent::Added { path: path.clone() });
                    }
                }
                Bucket::Modified => {
                    for path in &changes.modified {
                        self.upload(path)?;
                        emit(self.observers, DeployEvent::Modified { path: path.clone() });
                    }
                }
                Bucket::Copied => {
                    for pair in &changes.copied {
                        debug!(%pair, "copy");
                        self.store.copy(&pair.source, &pair.destination)?;
                        emit(
                            self.observers,
                            DeployEvent::Copied {
                                source: pair.source.clone(),
                            },
                        );
                    }
                }
                Bucket::Renamed => {
                    for pair in &changes.renamed {
                        debug!(%pair, "rename");
                        self.store.rename(&pair.source, &pair.destination)?;
                        emit(
                            self.observers,
                            DeployEvent::Renamed {
                                source: pair.source.clone(),
                                destination: pair.destination.clone(),
                            },
                        );
                    }
                }
                Bucket::Deleted => {
                    for path in &changes.deleted {
                        debug!(%path, "unlink");
                        self.store.unlink(path)?;
                        emit(self.observers, DeployEvent::Deleted { path: path.clone() });
                    }
                }
            }

            emit(self.observers, DeployEvent::bucket_end(bucket));
        }
        Ok(())
    }

    fn upload(&mut self, path: &RepoPath) -> DeployResult<()> {
        debug!(%path, "put");
        let mut content = self.source.open_file(path)?;
        self.store.put(content.as_mut(), path)?;
        Ok(())
    }
}
