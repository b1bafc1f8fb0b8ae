//! Branch entity

use serde::Serialize;

/// A branch of a revision source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    /// The currently checked-out branch
    pub is_default: bool,
}

impl Branch {
    pub fn new(name: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            is_default,
        }
    }

    /// Placeholder returned when branch listing is disabled
    pub fn synthetic() -> Self {
        Self::new("master", false)
    }
}
