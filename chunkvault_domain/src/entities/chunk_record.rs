//! Chunk record entity (spec §3).

use crate::value_objects::{Checksum, ChunkId, CorrelationId, FileId, LifecycleStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: ChunkId,
    pub file_id: FileId,
    pub sequence_number: u32,
    pub size: u64,
    pub compressed_size: u64,
    pub checksum: Checksum,
    pub is_compressed: bool,
    pub storage_provider_id: String,
    pub storage_path: String,
    pub status: LifecycleStatus,
    pub correlation_id: CorrelationId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChunkRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file_id: FileId,
        sequence_number: u32,
        size: u64,
        compressed_size: u64,
        checksum: Checksum,
        is_compressed: bool,
        storage_provider_id: impl Into<String>,
        storage_path: impl Into<String>,
        correlation_id: CorrelationId,
    ) -> Self {
        let now = Utc::now();
        let id = ChunkId::new(&file_id, sequence_number);
        Self {
            id,
            file_id,
            sequence_number,
            size,
            compressed_size,
            checksum,
            is_compressed,
            storage_provider_id: storage_provider_id.into(),
            storage_path: storage_path.into(),
            status: LifecycleStatus::Completed,
            correlation_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validates that a set of chunk records for one file satisfies spec §3's
/// sequencing invariant: `{0 .. chunkCount-1}` with no gaps or duplicates,
/// and that declared sizes sum to `file_size`.
pub fn validate_sequence(chunks: &[ChunkRecord], file_size: u64) -> Result<(), crate::error::ChunkVaultError> {
    let mut seen = vec![false; chunks.len()];
    let mut total_size: u64 = 0;
    for chunk in chunks {
        let idx = chunk.sequence_number as usize;
        if idx >= chunks.len() {
            return Err(crate::error::ChunkVaultError::invariant(format!(
                "sequence number {idx} out of range for {} chunks",
                chunks.len()
            )));
        }
        if seen[idx] {
            return Err(crate::error::ChunkVaultError::invariant(format!(
                "duplicate sequence number {idx}"
            )));
        }
        seen[idx] = true;
        total_size += chunk.size;
    }
    if seen.iter().any(|present| !present) {
        return Err(crate::error::ChunkVaultError::invariant("gap in chunk sequence numbers"));
    }
    if total_size != file_size {
        return Err(crate::error::ChunkVaultError::invariant(format!(
            "chunk sizes sum to {total_size}, expected {file_size}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(file_id: &FileId, seq: u32, size: u64) -> ChunkRecord {
        ChunkRecord::new(
            file_id.clone(),
            seq,
            size,
            size,
            Checksum::of(&[0u8; 4]),
            false,
            "filesystem",
            "path",
            CorrelationId::new(),
        )
    }

    #[test]
    fn contiguous_sequence_with_matching_total_size_is_valid() {
        let file_id = FileId::from_string("f1");
        let chunks = vec![chunk(&file_id, 0, 10), chunk(&file_id, 1, 20)];
        assert!(validate_sequence(&chunks, 30).is_ok());
    }

    #[test]
    fn gap_in_sequence_is_rejected() {
        let file_id = FileId::from_string("f1");
        let chunks = vec![chunk(&file_id, 0, 10), chunk(&file_id, 2, 20)];
        assert!(validate_sequence(&chunks, 30).is_err());
    }

    #[test]
    fn duplicate_sequence_is_rejected() {
        let file_id = FileId::from_string("f1");
        let chunks = vec![chunk(&file_id, 0, 10), chunk(&file_id, 0, 20)];
        assert!(validate_sequence(&chunks, 30).is_err());
    }

    #[test]
    fn mismatched_total_size_is_rejected() {
        let file_id = FileId::from_string("f1");
        let chunks = vec![chunk(&file_id, 0, 10), chunk(&file_id, 1, 20)];
        assert!(validate_sequence(&chunks, 31).is_err());
    }
}
