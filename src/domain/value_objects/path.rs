//! Repository Path Value Object
//!
//! A validated, repository-relative path used to address files both in the
//! revision source and on the remote store:
//! - Relative (no leading `/`)
//! - No traversal components (`..`)
//! - Normalized to forward slashes, without `.` or empty segments

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error when path validation fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path contains traversal components (..)
    #[error("path contains traversal components (..)")]
    ContainsTraversal,
    /// Path is absolute when relative is required
    #[error("absolute paths are not allowed")]
    AbsoluteNotAllowed,
    /// Path is empty
    #[error("path is empty")]
    Empty,
}

/// A validated repository-relative path
///
/// Stored as a `/`-separated string so the same value addresses a git tree
/// entry, a local directory and a remote shell path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoPath(String);

impl RepoPath {
    /// Create a new RepoPath after validation
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();

        if path.as_os_str().is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments: Vec<String> = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => return Err(PathError::ContainsTraversal),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathError::AbsoluteNotAllowed)
                }
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self(segments.join("/")))
    }

    /// The path as a `/`-separated string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to a platform path (relative)
    pub fn to_path_buf(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    /// Resolve against a root directory
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.to_path_buf())
    }

    /// Get the file name (last segment)
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The parent directory, or `None` for a top-level entry
    pub fn parent(&self) -> Option<RepoPath> {
        self.0
            .rfind('/')
            .map(|idx| RepoPath(self.0[..idx].to_string()))
    }

    /// All ancestor directories, nearest first
    ///
    /// `a/b/c.txt` yields `a/b`, then `a`.
    pub fn ancestors(&self) -> impl Iterator<Item = RepoPath> {
        std::iter::successors(self.parent(), RepoPath::parent)
    }

    /// Join with another relative path
    pub fn join<P: AsRef<Path>>(&self, path: P) -> Result<RepoPath, PathError> {
        RepoPath::new(self.to_path_buf().join(path))
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RepoPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<PathBuf> for RepoPath {
    type Error = PathError;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for RepoPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RepoPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RepoPath::new(&raw).map_err(serde::de::Error::custom)
    }
}
