//! File record entity (spec §3).

use crate::error::ChunkVaultError;
use crate::value_objects::{Checksum, CorrelationId, FileId, LifecycleStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a record describes a chunked file or a directory entry
/// discovered by the indexer (§4.H). Directories never go through the
/// chunk pipeline: `chunk_count` stays 0 and `status` stays `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub display_name: String,
    pub original_length: u64,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub checksum: Checksum,
    pub chunk_count: u32,
    pub status: LifecycleStatus,
    pub correlation_id: CorrelationId,
    pub parent_id: Option<FileId>,
    pub tags: BTreeSet<String>,
    /// Entry kind; `File` unless populated by the directory indexer.
    pub kind: FileKind,
    /// Absolute filesystem path, populated by the directory indexer
    /// (§4.B's "Files: by fullPath" index). `None` for files that only
    /// ever went through the upload pipeline.
    pub full_path: Option<String>,
    /// Lowercase extension without the leading dot, when known.
    pub extension: Option<String>,
    /// Set by the directory indexer once it has computed a content hash
    /// for a `File`-kind entry on disk (§4.H).
    pub is_indexed: bool,
}

impl FileRecord {
    /// Creates a new record in `Processing` status, as the engine does at
    /// the start of a split (§4.F step 4).
    pub fn new_processing(
        id: FileId,
        display_name: impl Into<String>,
        original_length: u64,
        checksum: Checksum,
        chunk_count: u32,
        correlation_id: CorrelationId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name: display_name.into(),
            original_length,
            content_type: None,
            created_at: now,
            modified_at: now,
            checksum,
            chunk_count,
            status: LifecycleStatus::Processing,
            correlation_id,
            parent_id: None,
            tags: BTreeSet::new(),
            kind: FileKind::File,
            full_path: None,
            extension: None,
            is_indexed: false,
        }
    }

    /// Creates a record for one directory-walk entry (§4.H). Directories
    /// and not-yet-hashed files start `Completed` with a zero checksum
    /// and no chunks — they never enter the chunk pipeline directly.
    #[allow(clippy::too_many_arguments)]
    pub fn new_directory_entry(
        id: FileId,
        kind: FileKind,
        display_name: impl Into<String>,
        full_path: impl Into<String>,
        original_length: u64,
        content_type: Option<String>,
        extension: Option<String>,
        parent_id: Option<FileId>,
        correlation_id: CorrelationId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name: display_name.into(),
            original_length,
            content_type,
            created_at: now,
            modified_at: now,
            checksum: Checksum::from_hex(""),
            chunk_count: 0,
            status: LifecycleStatus::Completed,
            correlation_id,
            parent_id,
            tags: BTreeSet::new(),
            kind,
            full_path: Some(full_path.into()),
            extension,
            is_indexed: false,
        }
    }

    /// Stamps the content checksum computed by the directory indexer and
    /// marks the record as indexed (§4.H).
    pub fn mark_indexed(&mut self, checksum: Checksum) {
        self.checksum = checksum;
        self.is_indexed = true;
        self.modified_at = Utc::now();
    }

    /// Transitions to `Completed`. Enforces the invariant that a completed
    /// record's chunk count matches the number of chunks actually placed.
    pub fn complete(&mut self, placed_chunk_count: u32) -> Result<(), ChunkVaultError> {
        if placed_chunk_count != self.chunk_count {
            return Err(ChunkVaultError::invariant(format!(
                "cannot complete file {}: declared chunk_count {} but {} chunks were placed",
                self.id, self.chunk_count, placed_chunk_count
            )));
        }
        self.status = LifecycleStatus::Completed;
        self.modified_at = Utc::now();
        Ok(())
    }

    /// Transitions to `Error`. Never leaves a record `Completed` with fewer
    /// chunks than declared (§5 cancellation invariant).
    pub fn fail(&mut self) {
        self.status = LifecycleStatus::Error;
        self.modified_at = Utc::now();
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn is_duplicate(&self) -> bool {
        self.tags.contains("duplicate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileRecord {
        FileRecord::new_processing(
            FileId::from_string("f1"),
            "report.pdf",
            4096,
            Checksum::of(b"hello\n"),
            3,
            CorrelationId::new(),
        )
    }

    #[test]
    fn new_record_starts_processing() {
        assert_eq!(sample().status, LifecycleStatus::Processing);
    }

    #[test]
    fn complete_rejects_chunk_count_mismatch() {
        let mut record = sample();
        assert!(record.complete(2).is_err());
        assert_eq!(record.status, LifecycleStatus::Processing);
    }

    #[test]
    fn complete_accepts_matching_chunk_count() {
        let mut record = sample();
        assert!(record.complete(3).is_ok());
        assert_eq!(record.status, LifecycleStatus::Completed);
    }

    #[test]
    fn fail_transitions_to_error_regardless_of_chunk_count() {
        let mut record = sample();
        record.fail();
        assert_eq!(record.status, LifecycleStatus::Error);
    }

    #[test]
    fn duplicate_tag_is_detected() {
        let mut record = sample();
        assert!(!record.is_duplicate());
        record.add_tag("duplicate");
        assert!(record.is_duplicate());
    }
}
