//! Local Directory Remote Store
//!
//! Deploys into a directory on this machine (a web root, a mounted share).
//! `init` takes an exclusive lock on `<root>/.revdeploy.lock` so two
//! deployments never interleave on the same target.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::ports::{RemoteStore, StoreError, StoreOperation, StoreResult};
use crate::domain::value_objects::{RepoPath, RevisionId};

/// Lock file created in the store root
pub const LOCK_FILE: &str = ".revdeploy.lock";

/// Remote store rooted at a local directory
pub struct LocalDirStore {
    root: PathBuf,
    marker: RepoPath,
    lock: Option<File>,
}

impl LocalDirStore {
    pub fn new(root: impl Into<PathBuf>, marker: RepoPath) -> Self {
        Self {
            root: root.into(),
            marker,
            lock: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &RepoPath) -> PathBuf {
        path.under(&self.root)
    }

    fn ensure_parent(
        &self,
        path: &Path,
        operation: StoreOperation,
        repo_path: &RepoPath,
    ) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::transfer(operation, repo_path, e))?;
        }
        Ok(())
    }

    /// Remove directories emptied by a rename/unlink, stopping at the root
    fn prune_empty_parents(&self, path: &RepoPath) {
        for dir in path.ancestors() {
            if fs::remove_dir(self.resolve(&dir)).is_err() {
                break;
            }
            debug!(dir = %dir, "removed empty directory");
        }
    }
}

impl RemoteStore for LocalDirStore {
    fn display_name(&self) -> String {
        format!("local:{}", self.root.display())
    }

    fn init(&mut self) -> StoreResult<()> {
        let unreachable =
            |e: io::Error| StoreError::Unreachable(format!("{}: {}", self.root.display(), e));

        fs::create_dir_all(&self.root).map_err(unreachable)?;
        let lock = File::create(self.root.join(LOCK_FILE)).map_err(unreachable)?;
        lock.try_lock_exclusive().map_err(|_| {
            StoreError::Unreachable(format!(
                "{} is locked by another deployment",
                self.root.display()
            ))
        })?;
        self.lock = Some(lock);
        Ok(())
    }

    fn get_marker(&mut self) -> StoreResult<Option<RevisionId>> {
        match fs::read_to_string(self.resolve(&self.marker)) {
            Ok(content) => Ok(RevisionId::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::transfer(
                StoreOperation::ReadMarker,
                &self.marker,
                e,
            )),
        }
    }

    fn put_marker(&mut self, revision: &RevisionId) -> StoreResult<()> {
        let target = self.resolve(&self.marker);
        let fail = |e: io::Error| StoreError::transfer(StoreOperation::WriteMarker, &self.marker, e);

        self.ensure_parent(&target, StoreOperation::WriteMarker, &self.marker)?;
        let dir = target.parent().unwrap_or(&self.root);
        let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
        tmp.write_all(revision.as_str().as_bytes()).map_err(fail)?;
        tmp.persist(&target).map_err(|e| fail(e.error))?;
        Ok(())
    }

    fn put(&mut self, content: &mut dyn Read, destination: &RepoPath) -> StoreResult<()> {
        let target = self.resolve(destination);
        self.ensure_parent(&target, StoreOperation::Put, destination)?;

        let mut file = File::create(&target)
            .map_err(|e| StoreError::transfer(StoreOperation::Put, destination, e))?;
        let bytes = io::copy(content, &mut file)
            .map_err(|e| StoreError::transfer(StoreOperation::Put, destination, e))?;
        debug!(path = %destination, bytes, "local put");
        Ok(())
    }

    fn copy(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()> {
        let from = self.resolve(source);
        if !from.is_file() {
            debug!(source = %source, "copy source missing, skipping");
            return Ok(());
        }
        let to = self.resolve(destination);
        self.ensure_parent(&to, StoreOperation::Copy, destination)?;
        fs::copy(&from, &to).map_err(|e| StoreError::transfer(StoreOperation::Copy, source, e))?;
        Ok(())
    }

    fn rename(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()> {
        let from = self.resolve(source);
        let to = self.resolve(destination);
        if !from.exists() {
            if to.exists() {
                debug!(source = %source, destination = %destination, "rename already applied");
                return Ok(());
            }
            return Err(StoreError::transfer(
                StoreOperation::Rename,
                source,
                "source does not exist",
            ));
        }

        self.ensure_parent(&to, StoreOperation::Rename, destination)?;
        fs::rename(&from, &to)
            .map_err(|e| StoreError::transfer(StoreOperation::Rename, source, e))?;
        self.prune_empty_parents(source);
        Ok(())
    }

    fn unlink(&mut self, path: &RepoPath) -> StoreResult<()> {
        match fs::remove_file(self.resolve(path)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path, "already deleted");
            }
            Err(e) => return Err(StoreError::transfer(StoreOperation::Unlink, path, e)),
        }
        self.prune_empty_parents(path);
        Ok(())
    }

    fn clean_up(&mut self) {
        if let Some(lock) = self.lock.take() {
            if let Err(e) = FileExt::unlock(&lock) {
                warn!(root = %self.root.display(), error = %e, "failed to release lock");
            }
        }
    }
}
