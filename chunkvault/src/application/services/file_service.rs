// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! FileService (spec §4.G): a thin orchestration layer over the chunk
//! engine, the metadata repositories, and the cache. It adds no business
//! rules of its own — every invariant already lives in `ChunkEngine` or
//! the entities it operates on — it only sequences calls and keeps the
//! cache coherent with the store.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use chunkvault_domain::entities::FileRecord;
use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::repositories::{Cache, EventBus, FileFilter, FileRepository};
use chunkvault_domain::value_objects::{CancellationToken, CorrelationId, FileId};
use tokio::io::AsyncWrite;

use crate::infrastructure::chunk_engine::ChunkEngine;
use crate::infrastructure::metrics::ChunkVaultMetrics;

fn cache_key(file_id: &FileId) -> String {
    format!("file:{}", file_id.as_str())
}

fn verdict_cache_key(file_id: &FileId) -> String {
    format!("verify:{}", file_id.as_str())
}

/// Orchestrates upload, download, listing, deletion, and verification of
/// whole files over a [`ChunkEngine`] (spec §4.G).
pub struct FileService<B: EventBus> {
    engine: std::sync::Arc<ChunkEngine<B>>,
    file_repo: std::sync::Arc<dyn FileRepository>,
    cache: std::sync::Arc<dyn Cache>,
    cache_ttl: Duration,
    metrics: std::sync::Arc<ChunkVaultMetrics>,
}

impl<B: EventBus> FileService<B> {
    pub fn new(
        engine: std::sync::Arc<ChunkEngine<B>>,
        file_repo: std::sync::Arc<dyn FileRepository>,
        cache: std::sync::Arc<dyn Cache>,
        cache_ttl: Duration,
        metrics: std::sync::Arc<ChunkVaultMetrics>,
    ) -> Self {
        Self {
            engine,
            file_repo,
            cache,
            cache_ttl,
            metrics,
        }
    }

    /// Splits `source` into chunks and records it as a new file (§4.F
    /// `split`). The display name defaults to the source's file name.
    pub async fn upload(
        &self,
        source: &Path,
        display_name: Option<String>,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<FileRecord, ChunkVaultError> {
        let display_name = display_name.unwrap_or_else(|| {
            source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.to_string_lossy().into_owned())
        });
        let file_id = FileId::new();
        let record = self.engine.split(source, file_id, display_name, correlation_id, cancellation).await?;
        self.metrics.files_uploaded_total.inc();
        self.cache_record(&record).await;
        Ok(record)
    }

    /// Reassembles a file's chunks into `sink` (§4.F `merge`). Refuses
    /// files whose record is not yet `Completed` (§4.G): a `Processing`
    /// record's chunk rows may still be in flight, and an `Error`/`Failed`
    /// one never finished placing all of its chunks.
    pub async fn download<S>(
        &self,
        file_id: &FileId,
        sink: &mut S,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<bool, ChunkVaultError>
    where
        S: AsyncWrite + Unpin + Send,
    {
        let record = self.get(file_id, correlation_id).await?;
        if record.status != chunkvault_domain::value_objects::LifecycleStatus::Completed {
            return Err(ChunkVaultError::invariant(format!(
                "file {file_id} is not Completed (status: {:?})",
                record.status
            )));
        }
        let downloaded = self.engine.merge(file_id, sink, correlation_id, cancellation).await?;
        if downloaded {
            self.metrics.files_downloaded_total.inc();
        }
        Ok(downloaded)
    }

    /// Looks up one file record, preferring the cache (§4.C) and
    /// populating it on a miss.
    pub async fn get(&self, file_id: &FileId, correlation_id: CorrelationId) -> Result<FileRecord, ChunkVaultError> {
        let key = cache_key(file_id);
        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(record) = serde_json::from_str::<FileRecord>(&cached) {
                return Ok(record);
            }
        }
        let record = self.file_repo.get(file_id, correlation_id).await?;
        self.cache_record(&record).await;
        Ok(record)
    }

    /// Lists known files matching `filter` (§4.B).
    pub async fn list(&self, filter: FileFilter, correlation_id: CorrelationId) -> Result<Vec<FileRecord>, ChunkVaultError> {
        self.file_repo.list(filter, correlation_id).await
    }

    /// Deletes a file and its chunks (§4.F `delete`), invalidating the
    /// cached record regardless of whether every chunk delete succeeded.
    pub async fn delete(&self, file_id: &FileId, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let result = self.engine.delete(file_id, correlation_id).await?;
        let _ = self.cache.delete(&cache_key(file_id)).await;
        let _ = self.cache.delete(&verdict_cache_key(file_id)).await;
        Ok(result)
    }

    /// Verifies a file's integrity (§4.F `mergeAndVerify`). A shallow
    /// verify only checks that the stored record completed successfully
    /// and is instant either way. A deep verify reassembles the whole file
    /// into memory and re-hashes it — the expensive path §4.G describes as
    /// short-circuiting on a cached verdict and caching the result with
    /// TTL afterward. Mismatches are reported, never auto-repaired (§9).
    pub async fn verify(
        &self,
        file_id: &FileId,
        deep: bool,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<bool, ChunkVaultError> {
        let record = self.get(file_id, correlation_id).await?;
        if !deep {
            return Ok(record.status == chunkvault_domain::value_objects::LifecycleStatus::Completed);
        }

        let verdict_key = verdict_cache_key(file_id);
        if let Some(cached) = self.cache.get(&verdict_key).await {
            if let Ok(verdict) = serde_json::from_str::<bool>(&cached) {
                return Ok(verdict);
            }
        }

        let mut buffer = Cursor::new(Vec::with_capacity(record.original_length as usize));
        let verified = self
            .engine
            .merge_and_verify(file_id, &mut buffer, correlation_id, true, cancellation)
            .await?;

        if let Ok(json) = serde_json::to_string(&verified) {
            let _ = self.cache.set(&verdict_key, json, self.cache_ttl).await;
        }
        Ok(verified)
    }

    async fn cache_record(&self, record: &FileRecord) {
        if let Ok(json) = serde_json::to_string(record) {
            let _ = self.cache.set(&cache_key(&record.id), json, self.cache_ttl).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::chunk_engine::ChunkEngineConfig;
    use crate::infrastructure::event_bus::{HandlerRegistry, InProcessEventBus};
    use crate::infrastructure::providers::FilesystemProvider;
    use crate::infrastructure::TtlCache;
    use chunkvault_domain::repositories::{ChunkRepository, StorageProvider};
    use chunkvault_domain::services::{PassthroughCompressionService, Sha256ChecksumService};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct MemFileRepo(std::sync::Mutex<HashMap<String, FileRecord>>);
    #[async_trait::async_trait]
    impl FileRepository for MemFileRepo {
        async fn get(&self, id: &FileId, _correlation_id: CorrelationId) -> Result<FileRecord, ChunkVaultError> {
            self.0.lock().unwrap().get(id.as_str()).cloned().ok_or_else(|| ChunkVaultError::not_found(id.to_string()))
        }
        async fn list(&self, _filter: FileFilter, _correlation_id: CorrelationId) -> Result<Vec<FileRecord>, ChunkVaultError> {
            Ok(self.0.lock().unwrap().values().cloned().collect())
        }
        async fn add(&self, record: &FileRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn replace(&self, record: &FileRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn delete(&self, id: &FileId, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().remove(id.as_str());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemChunkRepo(std::sync::Mutex<HashMap<String, chunkvault_domain::entities::ChunkRecord>>);
    #[async_trait::async_trait]
    impl ChunkRepository for MemChunkRepo {
        async fn get(
            &self,
            file_id: &FileId,
            sequence_number: u32,
            _correlation_id: CorrelationId,
        ) -> Result<chunkvault_domain::entities::ChunkRecord, ChunkVaultError> {
            self.0
                .lock()
                .unwrap()
                .get(chunkvault_domain::value_objects::ChunkId::new(file_id, sequence_number).as_str())
                .cloned()
                .ok_or_else(|| ChunkVaultError::not_found("no such chunk"))
        }
        async fn get_by_id(
            &self,
            chunk_id: &chunkvault_domain::value_objects::ChunkId,
            _correlation_id: CorrelationId,
        ) -> Result<chunkvault_domain::entities::ChunkRecord, ChunkVaultError> {
            self.0.lock().unwrap().get(chunk_id.as_str()).cloned().ok_or_else(|| ChunkVaultError::not_found("no such chunk"))
        }
        async fn add(&self, record: &chunkvault_domain::entities::ChunkRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn replace(&self, record: &chunkvault_domain::entities::ChunkRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn delete(&self, file_id: &FileId, sequence_number: u32, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0
                .lock()
                .unwrap()
                .remove(chunkvault_domain::value_objects::ChunkId::new(file_id, sequence_number).as_str());
            Ok(())
        }
        async fn list_by_file(&self, file_id: &FileId, _correlation_id: CorrelationId) -> Result<Vec<chunkvault_domain::entities::ChunkRecord>, ChunkVaultError> {
            let prefix = format!("{}_", file_id.as_str());
            Ok(self.0.lock().unwrap().values().filter(|c| c.id.as_str().starts_with(&prefix)).cloned().collect())
        }
        async fn delete_by_file(&self, file_id: &FileId, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            let prefix = format!("{}_", file_id.as_str());
            self.0.lock().unwrap().retain(|id, _| !id.starts_with(&prefix));
            Ok(())
        }
        async fn list_all(&self, _correlation_id: CorrelationId) -> Result<Vec<chunkvault_domain::entities::ChunkRecord>, ChunkVaultError> {
            Ok(self.0.lock().unwrap().values().cloned().collect())
        }
    }

    fn bus() -> Arc<InProcessEventBus> {
        Arc::new(InProcessEventBus::new(Arc::new(HandlerRegistry::new())))
    }

    #[tokio::test]
    async fn upload_then_get_hits_cache_on_second_call() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("upload.bin");
        std::fs::write(&source, b"orchestrated upload contents").unwrap();

        let provider: Arc<dyn StorageProvider> = Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let metrics = Arc::new(ChunkVaultMetrics::new().unwrap());
        let engine = Arc::new(ChunkEngine::new(
            vec![provider],
            Arc::clone(&file_repo),
            Arc::new(MemChunkRepo::default()) as Arc<dyn ChunkRepository>,
            Arc::new(Sha256ChecksumService),
            Arc::new(PassthroughCompressionService),
            bus(),
            ChunkEngineConfig::default(),
            Arc::clone(&metrics),
        ));
        let cache: Arc<dyn Cache> = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let service = FileService::new(engine, Arc::clone(&file_repo), cache, Duration::from_secs(60), Arc::clone(&metrics));

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let uploaded = service.upload(&source, None, correlation_id, &cancellation).await.unwrap();

        let fetched = service.get(&uploaded.id, correlation_id).await.unwrap();
        assert_eq!(fetched.id, uploaded.id);

        // A direct repo lookup (bypassing the cache this service just
        // populated) confirms the record was actually persisted, not only
        // cached.
        let cache_bypassed = file_repo.get(&uploaded.id, correlation_id).await.unwrap();
        assert_eq!(cache_bypassed.id, uploaded.id);
    }

    #[tokio::test]
    async fn deep_verify_caches_the_verdict_and_delete_invalidates_it() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("verify.bin");
        std::fs::write(&source, b"content that must round-trip intact").unwrap();

        let provider: Arc<dyn StorageProvider> = Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let metrics = Arc::new(ChunkVaultMetrics::new().unwrap());
        let engine = Arc::new(ChunkEngine::new(
            vec![provider],
            Arc::clone(&file_repo),
            Arc::new(MemChunkRepo::default()) as Arc<dyn ChunkRepository>,
            Arc::new(Sha256ChecksumService),
            Arc::new(PassthroughCompressionService),
            bus(),
            ChunkEngineConfig::default(),
            Arc::clone(&metrics),
        ));
        let cache: Arc<dyn Cache> = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let service = FileService::new(engine, Arc::clone(&file_repo), Arc::clone(&cache), Duration::from_secs(60), Arc::clone(&metrics));

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let uploaded = service.upload(&source, None, correlation_id, &cancellation).await.unwrap();

        assert!(service.verify(&uploaded.id, true, correlation_id, &cancellation).await.unwrap());
        assert_eq!(cache.get(&verdict_cache_key(&uploaded.id)).await, Some("true".to_string()));

        service.delete(&uploaded.id, correlation_id).await.unwrap();
        // The coalesced-delete flusher drains on its own schedule; give it
        // room to run before asserting the verdict key is gone.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.get(&verdict_cache_key(&uploaded.id)).await, None);
    }
}
