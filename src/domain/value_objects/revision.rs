//! Revision identifier value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque revision identifier from the version-control backend (a commit hash)
///
/// Revisions are only ordered through the backend's ancestry query; this type
/// deliberately implements equality but not ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    /// Parse a revision id from raw text, trimming surrounding whitespace
    ///
    /// Returns `None` for blank input, so an empty marker file reads as
    /// "never deployed".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display (first 7 characters)
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(7) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
