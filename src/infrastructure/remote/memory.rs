//! In-Memory Remote Store
//!
//! Keeps files, directories and the marker in process memory. Used as the
//! test double for deployment scenarios and as the `memory` adapter (a dry-run
//! target: nothing survives the process).
//!
//! Clones share state, so a test can hand one clone to the workspace and keep
//! another to inspect files and the recorded call log.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::domain::ports::{RemoteStore, StoreError, StoreOperation, StoreResult};
use crate::domain::value_objects::{RepoPath, RevisionId};

/// A recorded call against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Init,
    GetMarker,
    PutMarker(RevisionId),
    Put(RepoPath),
    Copy(RepoPath, RepoPath),
    Rename(RepoPath, RepoPath),
    Unlink(RepoPath),
    CleanUp,
}

impl StoreCall {
    /// Calls that change remote state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreCall::PutMarker(_)
                | StoreCall::Put(_)
                | StoreCall::Copy(..)
                | StoreCall::Rename(..)
                | StoreCall::Unlink(_)
        )
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<RepoPath, Vec<u8>>,
    dirs: BTreeSet<RepoPath>,
    marker: Option<RevisionId>,
    calls: Vec<StoreCall>,
    init_error: Option<StoreError>,
    failures: Vec<(StoreOperation, RepoPath)>,
}

impl MemoryState {
    fn take_failure(&mut self, operation: StoreOperation, path: &RepoPath) -> StoreResult<()> {
        let hit = self
            .failures
            .iter()
            .position(|(op, p)| *op == operation && p == path);
        match hit {
            Some(idx) => {
                self.failures.remove(idx);
                Err(StoreError::transfer(operation, path, "injected failure"))
            }
            None => Ok(()),
        }
    }

    fn write(&mut self, path: &RepoPath, content: Vec<u8>) {
        self.dirs.extend(path.ancestors());
        self.files.insert(path.clone(), content);
    }

    fn is_empty_dir(&self, dir: &RepoPath) -> bool {
        let prefix = format!("{}/", dir);
        !self.files.keys().any(|f| f.as_str().starts_with(&prefix))
            && !self.dirs.iter().any(|d| d.as_str().starts_with(&prefix))
    }

    fn prune_empty_parents(&mut self, path: &RepoPath) {
        for dir in path.ancestors() {
            if !self.is_empty_dir(&dir) {
                break;
            }
            self.dirs.remove(&dir);
        }
    }
}

/// Remote store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    name: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pre-populate a file without recording a call
    pub fn seed_file(&self, path: &RepoPath, content: impl Into<Vec<u8>>) {
        self.state().write(path, content.into());
    }

    /// Pre-populate the marker without recording a call
    pub fn seed_marker(&self, revision: RevisionId) {
        self.state().marker = Some(revision);
    }

    /// Make the next `init` fail with this error
    pub fn fail_init(&self, error: StoreError) {
        self.state().init_error = Some(error);
    }

    /// Make the next `operation` on `path` fail (one-shot)
    pub fn fail_on(&self, operation: StoreOperation, path: &RepoPath) {
        self.state().failures.push((operation, path.clone()));
    }

    pub fn marker(&self) -> Option<RevisionId> {
        self.state().marker.clone()
    }

    pub fn file(&self, path: &RepoPath) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }

    /// Snapshot of all files, keyed by path string
    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.state()
            .files
            .iter()
            .map(|(path, content)| (path.to_string(), content.clone()))
            .collect()
    }

    /// Directories currently present (excluding the root)
    pub fn dirs(&self) -> Vec<String> {
        self.state().dirs.iter().map(|d| d.to_string()).collect()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

impl RemoteStore for MemoryStore {
    fn display_name(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn init(&mut self) -> StoreResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::Init);
        match state.init_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn get_marker(&mut self) -> StoreResult<Option<RevisionId>> {
        let mut state = self.state();
        state.calls.push(StoreCall::GetMarker);
        Ok(state.marker.clone())
    }

    fn put_marker(&mut self, revision: &RevisionId) -> StoreResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::PutMarker(revision.clone()));
        state.marker = Some(revision.clone());
        Ok(())
    }

    fn put(&mut self, content: &mut dyn Read, destination: &RepoPath) -> StoreResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::Put(destination.clone()));
        state.take_failure(StoreOperation::Put, destination)?;

        let mut buffer = Vec::new();
        content
            .read_to_end(&mut buffer)
            .map_err(|e| StoreError::transfer(StoreOperation::Put, destination, e))?;
        debug!(path = %destination, bytes = buffer.len(), "memory put");
        state.write(destination, buffer);
        Ok(())
    }

    fn copy(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(StoreCall::Copy(source.clone(), destination.clone()));
        state.take_failure(StoreOperation::Copy, source)?;

        let content = state.files.get(source).cloned();
        if let Some(content) = content {
            state.write(destination, content);
        } else {
            debug!(source = %source, "copy source missing, skipping");
        }
        Ok(())
    }

    fn rename(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(StoreCall::Rename(source.clone(), destination.clone()));
        state.take_failure(StoreOperation::Rename, source)?;

        let moved = state.files.remove(source);
        match moved {
            Some(content) => {
                state.write(destination, content);
                state.prune_empty_parents(source);
                Ok(())
            }
            None if state.files.contains_key(destination) => Ok(()),
            None => Err(StoreError::transfer(
                StoreOperation::Rename,
                source,
                "source does not exist",
            )),
        }
    }

    fn unlink(&mut self, path: &RepoPath) -> StoreResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::Unlink(path.clone()));
        state.take_failure(StoreOperation::Unlink, path)?;

        state.files.remove(path);
        state.prune_empty_parents(path);
        Ok(())
    }

    fn clean_up(&mut self) {
        self.state().calls.push(StoreCall::CleanUp);
    }
}
