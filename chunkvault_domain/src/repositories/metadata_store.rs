//! MetadataStore ports (spec §4.B) — narrow, per-entity repository
//! interfaces rather than one generic repository, per the Design Notes.

use crate::entities::{ChunkRecord, FileRecord};
use crate::error::ChunkVaultError;
use crate::value_objects::{ChunkId, CorrelationId, FileId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Optional filter for `FileRepository::list`. All fields are conjunctive
/// (AND'd together); `None` means "don't filter on this field."
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub parent_id: Option<FileId>,
    pub content_type: Option<String>,
    pub checksum: Option<String>,
    pub tag: Option<String>,
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn get(&self, id: &FileId, correlation_id: CorrelationId) -> Result<FileRecord, ChunkVaultError>;

    async fn list(&self, filter: FileFilter, correlation_id: CorrelationId) -> Result<Vec<FileRecord>, ChunkVaultError>;

    /// Rejects if a record with this id already exists.
    async fn add(&self, record: &FileRecord, correlation_id: CorrelationId) -> Result<(), ChunkVaultError>;

    /// Rejects if no record with this id exists (no upsert).
    async fn replace(&self, record: &FileRecord, correlation_id: CorrelationId) -> Result<(), ChunkVaultError>;

    async fn delete(&self, id: &FileId, correlation_id: CorrelationId) -> Result<(), ChunkVaultError>;
}

#[async_trait]
pub trait ChunkRepository: Send + Sync {
    async fn get(&self, file_id: &FileId, sequence_number: u32, correlation_id: CorrelationId) -> Result<ChunkRecord, ChunkVaultError>;

    /// Looks up a chunk by its own stable id (`<fileId>_<sequenceNumber>`)
    /// rather than by its owning file, for `ChunkEngine::delete_chunk`.
    async fn get_by_id(&self, chunk_id: &ChunkId, correlation_id: CorrelationId) -> Result<ChunkRecord, ChunkVaultError>;

    async fn add(&self, record: &ChunkRecord, correlation_id: CorrelationId) -> Result<(), ChunkVaultError>;

    async fn replace(&self, record: &ChunkRecord, correlation_id: CorrelationId) -> Result<(), ChunkVaultError>;

    async fn delete(&self, file_id: &FileId, sequence_number: u32, correlation_id: CorrelationId) -> Result<(), ChunkVaultError>;

    /// Chunks for one file, ordered by sequence number ascending.
    async fn list_by_file(&self, file_id: &FileId, correlation_id: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError>;

    async fn delete_by_file(&self, file_id: &FileId, correlation_id: CorrelationId) -> Result<(), ChunkVaultError>;

    /// Every chunk record regardless of owning file. Backs the §9
    /// compatibility shim in `ChunkEngine::merge`: when `list_by_file`
    /// returns nothing for a file that should have chunks, the engine
    /// falls back to scanning every chunk and matching by id prefix.
    /// Records only discoverable this way are logged as suspect.
    async fn list_all(&self, correlation_id: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError>;
}

/// Optional collaborator collection (§4.B): a TTL-pruned log of
/// correlation-scoped operation records, for the observability collaborator.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub id: String,
    pub correlation_id: CorrelationId,
    pub message: String,
    pub level: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn append(&self, record: LogRecord) -> Result<(), ChunkVaultError>;

    async fn list_by_correlation(&self, correlation_id: CorrelationId) -> Result<Vec<LogRecord>, ChunkVaultError>;

    /// Deletes records older than `retention_horizon`. Stands in for a
    /// native TTL index, which SQLite does not provide (see DESIGN.md).
    async fn prune_older_than(&self, retention_horizon: DateTime<Utc>) -> Result<u64, ChunkVaultError>;
}
