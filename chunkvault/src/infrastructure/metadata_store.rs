// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `sqlx`-backed implementations of the domain's narrow per-entity
//! repository ports (§4.B): `SqliteFileRepository`, `SqliteChunkRepository`,
//! `SqliteLogRepository`, against the `files`/`chunks`/`logs` tables in
//! `../migrations`.

use chunkvault_domain::entities::{ChunkRecord, FileKind, FileRecord};
use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::repositories::{ChunkRepository, FileFilter, FileRepository, LogRecord, LogRepository};
use chunkvault_domain::value_objects::{Checksum, ChunkId, CorrelationId, FileId, LifecycleStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Decode, Row, SqlitePool, Type};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Decodes a column, mapping `sqlx`'s decode error onto the domain error
/// type. Neither `sqlx::Error` nor `ChunkVaultError` is local to this
/// crate, so a blanket `From` impl isn't available — this is the seam
/// instead.
fn col<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, ChunkVaultError>
where
    T: Decode<'r, sqlx::Sqlite> + Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| ChunkVaultError::invariant(format!("column {name}: {e}")))
}

fn sqlx_err(context: &str, err: sqlx::Error) -> ChunkVaultError {
    ChunkVaultError::transient_io(format!("{context}: {err}"))
}

pub struct SqliteFileRepository {
    pool: SqlitePool,
}

impl SqliteFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn status_to_str(status: LifecycleStatus) -> &'static str {
    match status {
        LifecycleStatus::Pending => "Pending",
        LifecycleStatus::Processing => "Processing",
        LifecycleStatus::Completed => "Completed",
        LifecycleStatus::Error => "Error",
        LifecycleStatus::Failed => "Failed",
    }
}

fn status_from_str(s: &str) -> Result<LifecycleStatus, ChunkVaultError> {
    match s {
        "Pending" => Ok(LifecycleStatus::Pending),
        "Processing" => Ok(LifecycleStatus::Processing),
        "Completed" => Ok(LifecycleStatus::Completed),
        "Error" => Ok(LifecycleStatus::Error),
        "Failed" => Ok(LifecycleStatus::Failed),
        other => Err(ChunkVaultError::invariant(format!("unknown lifecycle status {other}"))),
    }
}

fn kind_to_str(kind: FileKind) -> &'static str {
    match kind {
        FileKind::File => "File",
        FileKind::Directory => "Directory",
    }
}

fn kind_from_str(s: &str) -> FileKind {
    match s {
        "Directory" => FileKind::Directory,
        _ => FileKind::File,
    }
}

fn parse_correlation_id(s: &str) -> Result<CorrelationId, ChunkVaultError> {
    CorrelationId::from_str(s).map_err(|e| ChunkVaultError::invariant(format!("bad correlation id: {e}")))
}

fn file_row_to_record(row: &SqliteRow) -> Result<FileRecord, ChunkVaultError> {
    let tags_json: String = col(row, "tags")?;
    let tags: BTreeSet<String> = serde_json::from_str(&tags_json)?;
    let parent_id: Option<String> = col(row, "parent_id")?;

    Ok(FileRecord {
        id: FileId::from_string(col::<String>(row, "id")?),
        display_name: col(row, "display_name")?,
        original_length: col::<i64>(row, "original_length")? as u64,
        content_type: col(row, "content_type")?,
        created_at: col(row, "created_at")?,
        modified_at: col(row, "modified_at")?,
        checksum: Checksum::from_hex(col::<String>(row, "checksum")?),
        chunk_count: col::<i64>(row, "chunk_count")? as u32,
        status: status_from_str(&col::<String>(row, "status")?)?,
        correlation_id: parse_correlation_id(&col::<String>(row, "correlation_id")?)?,
        parent_id: parent_id.map(FileId::from_string),
        tags,
        kind: kind_from_str(&col::<String>(row, "kind")?),
        full_path: col(row, "full_path")?,
        extension: col(row, "extension")?,
        is_indexed: col::<i64>(row, "is_indexed")? != 0,
    })
}

#[async_trait]
impl FileRepository for SqliteFileRepository {
    async fn get(&self, id: &FileId, _correlation_id: CorrelationId) -> Result<FileRecord, ChunkVaultError> {
        let row = sqlx::query("SELECT * FROM files WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sqlx_err("file lookup", e))?
            .ok_or_else(|| ChunkVaultError::not_found(format!("no file record for {id}")))?;
        file_row_to_record(&row)
    }

    async fn list(&self, filter: FileFilter, _correlation_id: CorrelationId) -> Result<Vec<FileRecord>, ChunkVaultError> {
        let mut sql = String::from("SELECT * FROM files WHERE 1=1");
        if filter.parent_id.is_some() {
            sql.push_str(" AND parent_id = ?");
        }
        if filter.content_type.is_some() {
            sql.push_str(" AND content_type = ?");
        }
        if filter.checksum.is_some() {
            sql.push_str(" AND checksum = ?");
        }
        if filter.tag.is_some() {
            sql.push_str(" AND tags LIKE ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(parent_id) = &filter.parent_id {
            query = query.bind(parent_id.as_str().to_string());
        }
        if let Some(content_type) = &filter.content_type {
            query = query.bind(content_type.clone());
        }
        if let Some(checksum) = &filter.checksum {
            query = query.bind(checksum.clone());
        }
        if let Some(tag) = &filter.tag {
            query = query.bind(format!("%\"{tag}\"%"));
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|e| sqlx_err("file list", e))?;
        rows.iter().map(file_row_to_record).collect()
    }

    async fn add(&self, record: &FileRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM files WHERE id = ?")
            .bind(record.id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sqlx_err("file existence check", e))?;
        if existing.is_some() {
            return Err(ChunkVaultError::invariant(format!("file record {} already exists", record.id)));
        }
        insert_or_replace(&self.pool, record).await
    }

    async fn replace(&self, record: &FileRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM files WHERE id = ?")
            .bind(record.id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sqlx_err("file existence check", e))?;
        if existing.is_none() {
            return Err(ChunkVaultError::not_found(format!("no file record for {} to replace", record.id)));
        }
        insert_or_replace(&self.pool, record).await
    }

    async fn delete(&self, id: &FileId, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| sqlx_err("file delete", e))?;
        Ok(())
    }
}

async fn insert_or_replace(pool: &SqlitePool, record: &FileRecord) -> Result<(), ChunkVaultError> {
    let tags_json = serde_json::to_string(&record.tags)?;
    sqlx::query(
        "INSERT OR REPLACE INTO files
         (id, display_name, original_length, content_type, created_at, modified_at, checksum,
          chunk_count, status, correlation_id, parent_id, tags, kind, full_path, extension, is_indexed)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id.as_str())
    .bind(&record.display_name)
    .bind(record.original_length as i64)
    .bind(&record.content_type)
    .bind(record.created_at)
    .bind(record.modified_at)
    .bind(record.checksum.as_hex())
    .bind(record.chunk_count as i64)
    .bind(status_to_str(record.status))
    .bind(record.correlation_id.to_string())
    .bind(record.parent_id.as_ref().map(|id| id.as_str().to_string()))
    .bind(tags_json)
    .bind(kind_to_str(record.kind))
    .bind(&record.full_path)
    .bind(&record.extension)
    .bind(record.is_indexed as i64)
    .execute(pool)
    .await
    .map_err(|e| sqlx_err("file upsert", e))?;
    Ok(())
}

pub struct SqliteChunkRepository {
    pool: SqlitePool,
}

impl SqliteChunkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn chunk_row_to_record(row: &SqliteRow) -> Result<ChunkRecord, ChunkVaultError> {
    Ok(ChunkRecord {
        id: col::<String>(row, "id")?.into(),
        file_id: FileId::from_string(col::<String>(row, "file_id")?),
        sequence_number: col::<i64>(row, "sequence_number")? as u32,
        size: col::<i64>(row, "size")? as u64,
        compressed_size: col::<i64>(row, "compressed_size")? as u64,
        checksum: Checksum::from_hex(col::<String>(row, "checksum")?),
        is_compressed: col::<i64>(row, "is_compressed")? != 0,
        storage_provider_id: col(row, "storage_provider_id")?,
        storage_path: col(row, "storage_path")?,
        status: status_from_str(&col::<String>(row, "status")?)?,
        correlation_id: parse_correlation_id(&col::<String>(row, "correlation_id")?)?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

async fn upsert_chunk(pool: &SqlitePool, record: &ChunkRecord) -> Result<(), ChunkVaultError> {
    sqlx::query(
        "INSERT OR REPLACE INTO chunks
         (id, file_id, sequence_number, size, compressed_size, checksum, is_compressed,
          storage_provider_id, storage_path, status, correlation_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id.as_str())
    .bind(record.file_id.as_str())
    .bind(record.sequence_number as i64)
    .bind(record.size as i64)
    .bind(record.compressed_size as i64)
    .bind(record.checksum.as_hex())
    .bind(record.is_compressed as i64)
    .bind(&record.storage_provider_id)
    .bind(&record.storage_path)
    .bind(status_to_str(record.status))
    .bind(record.correlation_id.to_string())
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await
    .map_err(|e| sqlx_err("chunk upsert", e))?;
    Ok(())
}

#[async_trait]
impl ChunkRepository for SqliteChunkRepository {
    async fn get(&self, file_id: &FileId, sequence_number: u32, _correlation_id: CorrelationId) -> Result<ChunkRecord, ChunkVaultError> {
        let row = sqlx::query("SELECT * FROM chunks WHERE file_id = ? AND sequence_number = ?")
            .bind(file_id.as_str())
            .bind(sequence_number as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sqlx_err("chunk lookup", e))?
            .ok_or_else(|| ChunkVaultError::not_found(format!("no chunk {sequence_number} for file {file_id}")))?;
        chunk_row_to_record(&row)
    }

    async fn add(&self, record: &ChunkRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM chunks WHERE file_id = ? AND sequence_number = ?")
                .bind(record.file_id.as_str())
                .bind(record.sequence_number as i64)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| sqlx_err("chunk existence check", e))?;
        if existing.is_some() {
            return Err(ChunkVaultError::invariant(format!(
                "chunk {} already exists for file {}",
                record.sequence_number, record.file_id
            )));
        }
        upsert_chunk(&self.pool, record).await
    }

    async fn replace(&self, record: &ChunkRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM chunks WHERE file_id = ? AND sequence_number = ?")
                .bind(record.file_id.as_str())
                .bind(record.sequence_number as i64)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| sqlx_err("chunk existence check", e))?;
        if existing.is_none() {
            return Err(ChunkVaultError::not_found(format!(
                "no chunk {} for file {} to replace",
                record.sequence_number, record.file_id
            )));
        }
        upsert_chunk(&self.pool, record).await
    }

    async fn delete(&self, file_id: &FileId, sequence_number: u32, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        sqlx::query("DELETE FROM chunks WHERE file_id = ? AND sequence_number = ?")
            .bind(file_id.as_str())
            .bind(sequence_number as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| sqlx_err("chunk delete", e))?;
        Ok(())
    }

    async fn list_by_file(&self, file_id: &FileId, _correlation_id: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError> {
        let rows = sqlx::query("SELECT * FROM chunks WHERE file_id = ? ORDER BY sequence_number ASC")
            .bind(file_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| sqlx_err("chunk list", e))?;
        rows.iter().map(chunk_row_to_record).collect()
    }

    async fn delete_by_file(&self, file_id: &FileId, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        sqlx::query("DELETE FROM chunks WHERE file_id = ?")
            .bind(file_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| sqlx_err("chunk delete_by_file", e))?;
        Ok(())
    }

    async fn get_by_id(&self, chunk_id: &ChunkId, _correlation_id: CorrelationId) -> Result<ChunkRecord, ChunkVaultError> {
        let row = sqlx::query("SELECT * FROM chunks WHERE id = ?")
            .bind(chunk_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sqlx_err("chunk lookup by id", e))?
            .ok_or_else(|| ChunkVaultError::not_found(format!("no chunk record for {chunk_id}")))?;
        chunk_row_to_record(&row)
    }

    async fn list_all(&self, _correlation_id: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError> {
        let rows = sqlx::query("SELECT * FROM chunks ORDER BY file_id ASC, sequence_number ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| sqlx_err("chunk list_all", e))?;
        rows.iter().map(chunk_row_to_record).collect()
    }
}

pub struct SqliteLogRepository {
    pool: SqlitePool,
}

impl SqliteLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogRepository for SqliteLogRepository {
    async fn append(&self, record: LogRecord) -> Result<(), ChunkVaultError> {
        sqlx::query("INSERT INTO logs (id, correlation_id, message, level, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&record.id)
            .bind(record.correlation_id.to_string())
            .bind(&record.message)
            .bind(&record.level)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| sqlx_err("log append", e))?;
        Ok(())
    }

    async fn list_by_correlation(&self, correlation_id: CorrelationId) -> Result<Vec<LogRecord>, ChunkVaultError> {
        let rows = sqlx::query("SELECT * FROM logs WHERE correlation_id = ? ORDER BY created_at ASC")
            .bind(correlation_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| sqlx_err("log list", e))?;

        rows.iter()
            .map(|row| -> Result<LogRecord, ChunkVaultError> {
                Ok(LogRecord {
                    id: col(row, "id")?,
                    correlation_id: parse_correlation_id(&col::<String>(row, "correlation_id")?)?,
                    message: col(row, "message")?,
                    level: col(row, "level")?,
                    created_at: col(row, "created_at")?,
                })
            })
            .collect()
    }

    async fn prune_older_than(&self, retention_horizon: DateTime<Utc>) -> Result<u64, ChunkVaultError> {
        let result = sqlx::query("DELETE FROM logs WHERE created_at < ?")
            .bind(retention_horizon)
            .execute(&self.pool)
            .await
            .map_err(|e| sqlx_err("log prune", e))?;
        Ok(result.rows_affected())
    }
}
