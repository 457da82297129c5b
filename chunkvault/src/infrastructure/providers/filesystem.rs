// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Local filesystem storage provider (§4.A, §6 persisted layout):
//! `<basePath>/<hashed-prefix>/<chunkId>.chunk`, written atomically via a
//! write-to-temp-then-rename so a crash mid-write never leaves a partial
//! file observable at the final path.

use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::repositories::StorageProvider;
use chunkvault_domain::value_objects::{ChunkId, CorrelationId};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct FilesystemProvider {
    provider_id: String,
    base_path: PathBuf,
}

impl FilesystemProvider {
    pub fn new(provider_id: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            provider_id: provider_id.into(),
            base_path: base_path.into(),
        }
    }

    fn layout_path(&self, chunk_id: &ChunkId) -> PathBuf {
        self.base_path
            .join(chunk_id.hashed_prefix())
            .join(format!("{}.chunk", chunk_id.as_str()))
    }

    fn path_from_storage_path(&self, chunk_id: &ChunkId, storage_path: &str) -> PathBuf {
        if storage_path.is_empty() {
            self.layout_path(chunk_id)
        } else {
            self.base_path.join(storage_path)
        }
    }
}

#[async_trait]
impl StorageProvider for FilesystemProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn provider_type(&self) -> &str {
        "filesystem"
    }

    async fn put(&self, chunk_id: &ChunkId, bytes: &[u8], _correlation_id: CorrelationId) -> Result<String, ChunkVaultError> {
        let final_path = self.layout_path(chunk_id);
        let dir = final_path.parent().expect("layout path always has a parent");
        fs::create_dir_all(dir).await?;

        let temp_path = dir.join(format!(".{}.tmp", chunk_id.as_str()));
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
        }
        fs::rename(&temp_path, &final_path).await?;

        Ok(final_path
            .strip_prefix(&self.base_path)
            .unwrap_or(&final_path)
            .to_string_lossy()
            .into_owned())
    }

    async fn get(&self, chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<Vec<u8>, ChunkVaultError> {
        let path = self.path_from_storage_path(chunk_id, storage_path);
        fs::read(&path).await.map_err(ChunkVaultError::from)
    }

    async fn exists(&self, chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let path = self.path_from_storage_path(chunk_id, storage_path);
        Ok(fs::metadata(&path).await.is_ok())
    }

    async fn delete(&self, chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let path = self.path_from_storage_path(chunk_id, storage_path);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
