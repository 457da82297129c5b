//! File id value object — an opaque string identity for a [`FileRecord`](crate::entities::FileRecord).

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    /// Generates a new, time-sortable file id.
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Wraps an existing id string as-is (used when re-targeting or
    /// replacing an existing file record via `splitExisting`).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_provided_string() {
        let id = FileId::from_string("abc123");
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(FileId::new(), FileId::new());
    }
}
