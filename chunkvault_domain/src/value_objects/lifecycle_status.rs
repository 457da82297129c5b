//! File and chunk lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a [`FileRecord`](crate::entities::FileRecord) or
/// [`ChunkRecord`](crate::entities::ChunkRecord).
///
/// A record in `Completed` state must satisfy the invariants spelled out on
/// `FileRecord`: chunk count and checksum agreement. Deletion is allowed
/// from any terminal state (`Completed`, `Error`, `Failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Failed,
}

impl LifecycleStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Failed)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Error => "Error",
            Self::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_error_failed_are_terminal() {
        assert!(LifecycleStatus::Completed.is_terminal());
        assert!(LifecycleStatus::Error.is_terminal());
        assert!(LifecycleStatus::Failed.is_terminal());
    }

    #[test]
    fn pending_and_processing_are_not_terminal() {
        assert!(!LifecycleStatus::Pending.is_terminal());
        assert!(!LifecycleStatus::Processing.is_terminal());
    }
}
