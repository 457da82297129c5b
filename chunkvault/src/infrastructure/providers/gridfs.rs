// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! GridFS-style object-store bucket (§4.A), realized as a `sqlx` blob-rows
//! table rather than a literal two-collection GridFS bucket — no document
//! database exists anywhere in the corpus this was grown from, and a
//! single `gridfs_blobs(chunk_id, bytes)` table is sufficient to satisfy
//! the put/get/exists/delete contract and the "opaque storagePath" promise
//! (see DESIGN.md).

use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::repositories::StorageProvider;
use chunkvault_domain::value_objects::{ChunkId, CorrelationId};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct GridFsProvider {
    provider_id: String,
    pool: SqlitePool,
}

impl GridFsProvider {
    pub fn new(provider_id: impl Into<String>, pool: SqlitePool) -> Self {
        Self {
            provider_id: provider_id.into(),
            pool,
        }
    }
}

#[async_trait]
impl StorageProvider for GridFsProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn provider_type(&self) -> &str {
        "gridfs"
    }

    async fn put(&self, chunk_id: &ChunkId, bytes: &[u8], _correlation_id: CorrelationId) -> Result<String, ChunkVaultError> {
        sqlx::query("INSERT INTO gridfs_blobs (chunk_id, bytes, created_at) VALUES (?, ?, ?)")
            .bind(chunk_id.as_str())
            .bind(bytes)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("gridfs put failed: {e}")))?;

        // The object id IS the chunk id in this backend: opaque to callers,
        // who must still persist whatever `put` returns (§4.A).
        Ok(chunk_id.as_str().to_string())
    }

    async fn get(&self, _chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<Vec<u8>, ChunkVaultError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT bytes FROM gridfs_blobs WHERE chunk_id = ?")
            .bind(storage_path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("gridfs get failed: {e}")))?;

        row.map(|(bytes,)| bytes)
            .ok_or_else(|| ChunkVaultError::not_found(format!("no gridfs blob for {storage_path}")))
    }

    async fn exists(&self, _chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM gridfs_blobs WHERE chunk_id = ?")
            .bind(storage_path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("gridfs exists check failed: {e}")))?;
        Ok(row.is_some())
    }

    async fn delete(&self, _chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let result = sqlx::query("DELETE FROM gridfs_blobs WHERE chunk_id = ?")
            .bind(storage_path)
            .execute(&self.pool)
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("gridfs delete failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}
