//! File change set entity
//!
//! The classified delta between two revisions, split into five buckets.

use std::fmt;

use serde::Serialize;

use crate::domain::value_objects::RepoPath;

/// A `(source, destination)` pair for copies and renames
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PathPair {
    pub source: RepoPath,
    pub destination: RepoPath,
}

impl PathPair {
    pub fn new(source: RepoPath, destination: RepoPath) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl fmt::Display for PathPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// One of the five change categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Added,
    Modified,
    Copied,
    Renamed,
    Deleted,
}

impl Bucket {
    /// Buckets in the order they are applied to a remote store
    pub const TRANSFER_ORDER: [Bucket; 5] = [
        Bucket::Added,
        Bucket::Modified,
        Bucket::Copied,
        Bucket::Renamed,
        Bucket::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Added => "added",
            Bucket::Modified => "modified",
            Bucket::Copied => "copied",
            Bucket::Renamed => "renamed",
            Bucket::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified file changes between two revisions
///
/// A path appears in at most one bucket. Order within a bucket is the order
/// the backend reported; nothing here re-sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileChangeSet {
    pub added: Vec<RepoPath>,
    pub modified: Vec<RepoPath>,
    pub deleted: Vec<RepoPath>,
    pub copied: Vec<PathPair>,
    pub renamed: Vec<PathPair>,
}

impl FileChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change set for a full install: every path is an addition
    pub fn install(paths: Vec<RepoPath>) -> Self {
        Self {
            added: paths,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all buckets
    pub fn len(&self) -> usize {
        self.added.len()
            + self.modified.len()
            + self.deleted.len()
            + self.copied.len()
            + self.renamed.len()
    }

    /// Number of entries in one bucket
    pub fn count(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Added => self.added.len(),
            Bucket::Modified => self.modified.len(),
            Bucket::Copied => self.copied.len(),
            Bucket::Renamed => self.renamed.len(),
            Bucket::Deleted => self.deleted.len(),
        }
    }

    pub fn stats(&self) -> ChangeStats {
        ChangeStats {
            added: self.added.len(),
            modified: self.modified.len(),
            copied: self.copied.len(),
            renamed: self.renamed.len(),
            deleted: self.deleted.len(),
        }
    }
}

/// Per-bucket totals of a change set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeStats {
    pub added: usize,
    pub modified: usize,
    pub copied: usize,
    pub renamed: usize,
    pub deleted: usize,
}

impl ChangeStats {
    pub fn total(&self) -> usize {
        self.added + self.modified + self.copied + self.renamed + self.deleted
    }
}

impl fmt::Display for ChangeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} modified, {} copied, {} renamed, {} deleted",
            self.added, self.modified, self.copied, self.renamed, self.deleted
        )
    }
}
