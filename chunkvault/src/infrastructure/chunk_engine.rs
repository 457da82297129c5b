// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The chunk engine (spec §4.F): splits a file into chunks distributed
//! round-robin across the configured providers, and reassembles or deletes
//! a file's chunks again. The largest single component in the system —
//! everything else in this crate exists to give it somewhere to read from,
//! write to, and report through.

use chunkvault_domain::entities::{ChunkRecord, FileRecord};
use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::events::{ChunkStored, FileProcessed};
use chunkvault_domain::repositories::{ChunkRepository, EventBus, FileRepository, StorageProvider};
use chunkvault_domain::services::{ChecksumService, CompressionService};
use chunkvault_domain::value_objects::{
    optimal_for_file_size, CancellationToken, ChunkId, ChunkSize, ChunkSizeConfig, CompressionLevel, CorrelationId,
    FileId, StreamingHasher,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Semaphore;

use crate::infrastructure::mapped_file_window::MappedFileWindow;
use crate::infrastructure::metrics::ChunkVaultMetrics;

/// Bytes read per call when streaming the whole-file checksum pass; chosen
/// to keep a single `spawn_blocking` hop reading comfortably sized slices
/// out of the memory-mapped window rather than one read per byte range.
const STREAM_BLOCK_BYTES: u64 = 4 * 1024 * 1024;

/// The tunables behind split/merge, resolved from [`ChunkVaultConfig`](crate::infrastructure::config::ChunkVaultConfig)
/// at the composition root.
#[derive(Debug, Clone, Copy)]
pub struct ChunkEngineConfig {
    pub chunk_size: ChunkSizeConfig,
    pub compression_enabled: bool,
    pub compression_level: CompressionLevel,
    /// Bounded concurrency for chunk puts during `split` (§5, default 4).
    pub max_parallel_tasks: usize,
    /// Bounded concurrency for `merge_and_verify` calls (§5, default 4).
    pub max_parallel_verifications: usize,
}

impl Default for ChunkEngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: ChunkSizeConfig::default(),
            compression_enabled: true,
            compression_level: CompressionLevel::default(),
            max_parallel_tasks: 4,
            max_parallel_verifications: 4,
        }
    }
}

/// Splits, compresses, hashes, places, and reassembles chunked files (spec
/// §4.F). Generic over the event bus implementation so it can be composed
/// with [`InProcessEventBus`](crate::infrastructure::event_bus::InProcessEventBus)
/// in production or a recording stub in tests.
pub struct ChunkEngine<B: EventBus> {
    providers: Vec<Arc<dyn StorageProvider>>,
    providers_by_id: HashMap<String, Arc<dyn StorageProvider>>,
    next_provider: AtomicUsize,
    file_repo: Arc<dyn FileRepository>,
    chunk_repo: Arc<dyn ChunkRepository>,
    checksum: Arc<dyn ChecksumService>,
    compression: Arc<dyn CompressionService>,
    event_bus: Arc<B>,
    config: ChunkEngineConfig,
    chunk_semaphore: Arc<Semaphore>,
    verify_semaphore: Arc<Semaphore>,
    metrics: Arc<ChunkVaultMetrics>,
}

impl<B: EventBus> ChunkEngine<B> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        providers: Vec<Arc<dyn StorageProvider>>,
        file_repo: Arc<dyn FileRepository>,
        chunk_repo: Arc<dyn ChunkRepository>,
        checksum: Arc<dyn ChecksumService>,
        compression: Arc<dyn CompressionService>,
        event_bus: Arc<B>,
        config: ChunkEngineConfig,
        metrics: Arc<ChunkVaultMetrics>,
    ) -> Self {
        let providers_by_id = providers
            .iter()
            .map(|provider| (provider.provider_id().to_string(), Arc::clone(provider)))
            .collect();
        let chunk_semaphore = Arc::new(Semaphore::new(config.max_parallel_tasks.max(1)));
        let verify_semaphore = Arc::new(Semaphore::new(config.max_parallel_verifications.max(1)));
        Self {
            providers,
            providers_by_id,
            next_provider: AtomicUsize::new(0),
            file_repo,
            chunk_repo,
            checksum,
            compression,
            event_bus,
            config,
            chunk_semaphore,
            verify_semaphore,
            metrics,
        }
    }

    /// Pure policy function — same input, same config, same output (§4.F).
    pub fn optimal_chunk_size(&self, file_size: u64) -> ChunkSize {
        optimal_for_file_size(file_size, self.config.chunk_size)
    }

    fn next_provider(&self) -> Result<Arc<dyn StorageProvider>, ChunkVaultError> {
        if self.providers.is_empty() {
            return Err(ChunkVaultError::backend_config("no storage providers configured"));
        }
        let idx = self.next_provider.fetch_add(1, Ordering::Relaxed) % self.providers.len();
        Ok(Arc::clone(&self.providers[idx]))
    }

    fn resolve_provider(&self, provider_id: &str) -> Result<Arc<dyn StorageProvider>, ChunkVaultError> {
        self.providers_by_id
            .get(provider_id)
            .cloned()
            .ok_or_else(|| ChunkVaultError::backend_config(format!("unknown storage provider {provider_id}")))
    }

    /// Splits a new file: creates its `FileRecord` in `Processing` status,
    /// places every chunk, and transitions the record to `Completed`
    /// (or `Error` — see §7 — on any chunk failure).
    pub async fn split(
        &self,
        source: &Path,
        file_id: FileId,
        display_name: impl Into<String>,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<FileRecord, ChunkVaultError> {
        self.split_inner(source, file_id, display_name.into(), correlation_id, cancellation)
            .await
    }

    /// As [`split`](Self::split), but for re-targeting or replacing an
    /// existing file record (§4.F's `splitExisting`) — the display name is
    /// derived from the source path rather than supplied by the caller.
    pub async fn split_existing(
        &self,
        source: &Path,
        reuse_id: FileId,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<FileRecord, ChunkVaultError> {
        let display_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| reuse_id.to_string());
        self.split_inner(source, reuse_id, display_name, correlation_id, cancellation).await
    }

    async fn split_inner(
        &self,
        source: &Path,
        file_id: FileId,
        display_name: String,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<FileRecord, ChunkVaultError> {
        cancellation.check()?;
        let split_started_at = std::time::Instant::now();

        let length = tokio::fs::metadata(source).await?.len();
        if length == 0 {
            self.metrics.record_error("invariant");
            return Err(ChunkVaultError::invariant("cannot split an empty input"));
        }

        let window = {
            let path = source.to_path_buf();
            tokio::task::spawn_blocking(move || MappedFileWindow::open(&path))
                .await
                .map_err(|e| ChunkVaultError::transient_io(format!("open task panicked: {e}")))??
        };
        let window = Arc::new(window);

        let checksum = self.whole_file_checksum(&window).await?;
        cancellation.check()?;

        let chunk_size = self.optimal_chunk_size(length);
        let count = chunk_size.chunks_needed_for_file(length);

        let mut file_record = FileRecord::new_processing(
            file_id.clone(),
            display_name,
            length,
            checksum,
            count,
            correlation_id,
        );
        self.file_repo.add(&file_record, correlation_id).await?;

        let mut tasks = Vec::with_capacity(count as usize);
        for sequence in 0..count {
            cancellation.check()?;
            let start = sequence as u64 * chunk_size.bytes();
            let end = ((sequence as u64 + 1) * chunk_size.bytes()).min(length);
            let provider = self.next_provider()?;

            let window = Arc::clone(&window);
            let checksum_service = Arc::clone(&self.checksum);
            let compression = Arc::clone(&self.compression);
            let chunk_repo = Arc::clone(&self.chunk_repo);
            let event_bus = Arc::clone(&self.event_bus);
            let semaphore = Arc::clone(&self.chunk_semaphore);
            let compression_enabled = self.config.compression_enabled;
            let compression_level = self.config.compression_level;
            let chunk_file_id = file_id.clone();
            let metrics = Arc::clone(&self.metrics);

            tasks.push(tokio::spawn(async move {
                let permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ChunkVaultError::cancelled(format!("chunk semaphore closed: {e}")))?;

                let placed = place_chunk(
                    &window,
                    sequence,
                    start,
                    end,
                    &provider,
                    &checksum_service,
                    &compression,
                    compression_enabled,
                    compression_level,
                    &chunk_file_id,
                    correlation_id,
                )
                .await;
                drop(permit);

                let record = match placed {
                    Ok(record) => record,
                    Err(e) => {
                        metrics.record_error(e.category());
                        return Err(e);
                    }
                };
                if let Err(e) = chunk_repo.add(&record, correlation_id).await {
                    metrics.record_error(e.category());
                    return Err(e);
                }
                metrics.chunks_stored_total.inc();
                metrics.bytes_stored_total.inc_by(record.size);
                event_bus
                    .publish(ChunkStored {
                        event_id: uuid::Uuid::new_v4(),
                        chunk_id: record.id.as_str().to_string(),
                        file_id: record.file_id.as_str().to_string(),
                        sequence: record.sequence_number,
                        size: record.size,
                        compressed_size: record.compressed_size,
                        checksum: record.checksum.as_hex().to_string(),
                        provider_id: record.storage_provider_id.clone(),
                        correlation_id,
                        timestamp: chrono::Utc::now(),
                    })
                    .await;
                Ok::<ChunkRecord, ChunkVaultError>(record)
            }));
        }

        let mut placed = Vec::with_capacity(tasks.len());
        let mut first_error: Option<ChunkVaultError> = None;
        for task in tasks {
            match task.await {
                Ok(Ok(record)) => placed.push(record),
                Ok(Err(e)) => first_error.get_or_insert(e),
                Err(join_err) => {
                    first_error.get_or_insert(ChunkVaultError::transient_io(format!("chunk task panicked: {join_err}")))
                }
            };
        }

        if let Some(err) = first_error {
            file_record.fail();
            self.file_repo.replace(&file_record, correlation_id).await?;
            self.metrics.record_error(err.category());
            self.metrics.split_duration_seconds.observe(split_started_at.elapsed().as_secs_f64());
            tracing::warn!(file_id = %file_record.id, error = %err, "split failed, file marked Error");
            return Err(err);
        }

        placed.sort_by_key(|chunk| chunk.sequence_number);
        if let Err(err) = chunkvault_domain::entities::validate_sequence(&placed, length) {
            file_record.fail();
            self.file_repo.replace(&file_record, correlation_id).await?;
            self.metrics.record_error(err.category());
            self.metrics.split_duration_seconds.observe(split_started_at.elapsed().as_secs_f64());
            tracing::warn!(file_id = %file_record.id, error = %err, "split produced an invalid chunk sequence, file marked Error");
            return Err(err);
        }

        file_record.complete(placed.len() as u32)?;
        self.file_repo.replace(&file_record, correlation_id).await?;
        self.metrics.split_duration_seconds.observe(split_started_at.elapsed().as_secs_f64());

        self.event_bus
            .publish(FileProcessed {
                event_id: uuid::Uuid::new_v4(),
                file_id: file_record.id.as_str().to_string(),
                file_name: file_record.display_name.clone(),
                file_size: file_record.original_length,
                checksum: file_record.checksum.as_hex().to_string(),
                chunk_count: file_record.chunk_count,
                correlation_id,
                timestamp: chrono::Utc::now(),
            })
            .await;

        Ok(file_record)
    }

    async fn whole_file_checksum(&self, window: &Arc<MappedFileWindow>) -> Result<chunkvault_domain::value_objects::Checksum, ChunkVaultError> {
        let window = Arc::clone(window);
        tokio::task::spawn_blocking(move || {
            let mut hasher = StreamingHasher::new();
            let len = window.len();
            let mut offset = 0u64;
            while offset < len {
                let take = STREAM_BLOCK_BYTES.min(len - offset);
                let bytes = window.read(offset, take)?;
                hasher.update(&bytes);
                offset += take;
            }
            Ok::<_, ChunkVaultError>(hasher.finalize())
        })
        .await
        .map_err(|e| ChunkVaultError::transient_io(format!("checksum task panicked: {e}")))?
    }

    /// Reassembles a file's chunks into `sink`, in sequence-number order
    /// (§4.F `merge`). Returns `Ok(false)` — rather than an error — for any
    /// I/O failure, missing provider, or missing bytes; cancellation still
    /// propagates as `Err`.
    pub async fn merge<S>(
        &self,
        file_id: &FileId,
        sink: &mut S,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<bool, ChunkVaultError>
    where
        S: AsyncWrite + Unpin + Send,
    {
        let started_at = std::time::Instant::now();
        let outcome = match self.merge_inner(file_id, sink, correlation_id, cancellation).await {
            Ok(()) => Ok(true),
            Err(ChunkVaultError::Cancelled(reason)) => Err(ChunkVaultError::Cancelled(reason)),
            Err(e) => {
                self.metrics.record_error(e.category());
                tracing::warn!(file_id = %file_id, error = %e, "merge did not complete");
                Ok(false)
            }
        };
        self.metrics.merge_duration_seconds.observe(started_at.elapsed().as_secs_f64());
        outcome
    }

    async fn merge_inner<S>(
        &self,
        file_id: &FileId,
        sink: &mut S,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<(), ChunkVaultError>
    where
        S: AsyncWrite + Unpin + Send,
    {
        cancellation.check()?;

        let mut chunks = self.chunk_repo.list_by_file(file_id, correlation_id).await?;
        if chunks.is_empty() {
            // §9 compatibility shim: a record only discoverable by scanning
            // every chunk and matching the id prefix is logged as suspect.
            let all = self.chunk_repo.list_all(correlation_id).await?;
            let prefix = format!("{}_", file_id.as_str());
            chunks = all.into_iter().filter(|chunk| chunk.id.as_str().starts_with(&prefix)).collect();
            if !chunks.is_empty() {
                tracing::warn!(
                    file_id = %file_id,
                    count = chunks.len(),
                    "chunks recovered only via full-table scan; records are suspect"
                );
            }
        }
        if chunks.is_empty() {
            return Err(ChunkVaultError::not_found(format!("no chunks for file {file_id}")));
        }
        chunks.sort_by_key(|chunk| chunk.sequence_number);

        let file_record = self.file_repo.get(file_id, correlation_id).await?;
        if let Err(err) = chunkvault_domain::entities::validate_sequence(&chunks, file_record.original_length) {
            tracing::warn!(file_id = %file_id, error = %err, "merge found an invalid chunk sequence");
            return Err(err);
        }

        for chunk in chunks {
            cancellation.check()?;
            let provider = self.resolve_provider(&chunk.storage_provider_id)?;
            let bytes = provider.get(&chunk.id, &chunk.storage_path, correlation_id).await?;
            let payload = if chunk.is_compressed {
                self.compression.decompress(&bytes)?
            } else {
                bytes
            };
            sink.write_all(&payload).await.map_err(ChunkVaultError::from)?;
        }
        sink.flush().await.map_err(ChunkVaultError::from)?;
        Ok(())
    }

    /// As [`merge`](Self::merge), plus (when `verify` is set) rewinds the
    /// sink and re-hashes the bytes just written, comparing against the
    /// file record's stored checksum case-insensitively (§4.F
    /// `mergeAndVerify`). Bounded by `max_parallel_verifications` since
    /// the re-hash pass is the expensive half of this call.
    pub async fn merge_and_verify<S>(
        &self,
        file_id: &FileId,
        sink: &mut S,
        correlation_id: CorrelationId,
        verify: bool,
        cancellation: &CancellationToken,
    ) -> Result<bool, ChunkVaultError>
    where
        S: AsyncRead + AsyncWrite + AsyncSeek + Unpin + Send,
    {
        let _permit = self
            .verify_semaphore
            .acquire()
            .await
            .map_err(|e| ChunkVaultError::cancelled(format!("verify semaphore closed: {e}")))?;

        let start_pos = sink.stream_position().await.map_err(ChunkVaultError::from)?;
        let merged = self.merge(file_id, sink, correlation_id, cancellation).await?;
        if !merged || !verify {
            return Ok(merged);
        }

        let end_pos = sink.stream_position().await.map_err(ChunkVaultError::from)?;
        sink.seek(std::io::SeekFrom::Start(start_pos)).await.map_err(ChunkVaultError::from)?;

        let mut hasher = StreamingHasher::new();
        let mut remaining = end_pos - start_pos;
        let mut buffer = vec![0u8; 64 * 1024];
        while remaining > 0 {
            let take = (buffer.len() as u64).min(remaining) as usize;
            sink.read_exact(&mut buffer[..take]).await.map_err(ChunkVaultError::from)?;
            hasher.update(&buffer[..take]);
            remaining -= take as u64;
        }
        sink.seek(std::io::SeekFrom::Start(end_pos)).await.map_err(ChunkVaultError::from)?;

        let recomputed = hasher.finalize();
        let file_record = self.file_repo.get(file_id, correlation_id).await?;
        let matches = recomputed.as_hex().eq_ignore_ascii_case(file_record.checksum.as_hex());
        if !matches {
            tracing::warn!(
                file_id = %file_id,
                expected = %file_record.checksum,
                actual = %recomputed,
                "verify: recomputed checksum does not match stored record"
            );
        }
        Ok(matches)
    }

    /// Deletes every chunk for a file, grouped by provider, then
    /// unconditionally deletes the metadata rows so deletion stays
    /// idempotent even when some provider deletes fail (§4.F `delete`).
    pub async fn delete(&self, file_id: &FileId, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let chunks = self.chunk_repo.list_by_file(file_id, correlation_id).await?;

        let mut by_provider: HashMap<String, Vec<ChunkRecord>> = HashMap::new();
        for chunk in chunks {
            by_provider.entry(chunk.storage_provider_id.clone()).or_default().push(chunk);
        }

        let mut all_succeeded = true;
        for (provider_id, group) in by_provider {
            let Ok(provider) = self.resolve_provider(&provider_id) else {
                all_succeeded = false;
                continue;
            };
            for chunk in group {
                match provider.delete(&chunk.id, &chunk.storage_path, correlation_id).await {
                    Ok(true) => {}
                    Ok(false) => all_succeeded = false,
                    Err(e) => {
                        self.metrics.record_error(e.category());
                        tracing::warn!(chunk_id = %chunk.id, error = %e, "provider delete failed");
                        all_succeeded = false;
                    }
                }
            }
        }

        self.chunk_repo.delete_by_file(file_id, correlation_id).await?;
        self.file_repo.delete(file_id, correlation_id).await?;

        Ok(all_succeeded)
    }

    /// Deletes a single chunk's bytes, then (only on success) its record
    /// (§4.F `deleteChunk`).
    pub async fn delete_chunk(&self, chunk_id: &ChunkId, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let chunk = self.chunk_repo.get_by_id(chunk_id, correlation_id).await?;
        let provider = self.resolve_provider(&chunk.storage_provider_id)?;
        let deleted = provider.delete(chunk_id, &chunk.storage_path, correlation_id).await?;
        if deleted {
            self.chunk_repo.delete(&chunk.file_id, chunk.sequence_number, correlation_id).await?;
        }
        Ok(deleted)
    }
}

/// Reads one byte range, hashes it, optionally compresses it, and puts it
/// with the chosen provider. A free function (not a method) so it can be
/// moved wholesale into the `tokio::spawn`ed task in [`ChunkEngine::split_inner`]
/// without capturing `&self`.
#[allow(clippy::too_many_arguments)]
async fn place_chunk(
    window: &Arc<MappedFileWindow>,
    sequence: u32,
    start: u64,
    end: u64,
    provider: &Arc<dyn StorageProvider>,
    checksum_service: &Arc<dyn ChecksumService>,
    compression: &Arc<dyn CompressionService>,
    compression_enabled: bool,
    compression_level: CompressionLevel,
    file_id: &FileId,
    correlation_id: CorrelationId,
) -> Result<ChunkRecord, ChunkVaultError> {
    let window = Arc::clone(window);
    let checksum_service = Arc::clone(checksum_service);
    let compression = Arc::clone(compression);

    let (raw_size, range_checksum, payload, is_compressed) = tokio::task::spawn_blocking(move || {
        let raw = window.read(start, end - start)?;
        let range_checksum = checksum_service.checksum_bytes(&raw);
        if compression_enabled {
            let compressed = compression.compress(&raw, compression_level)?;
            Ok::<_, ChunkVaultError>((raw.len() as u64, range_checksum, compressed, true))
        } else {
            let raw_len = raw.len() as u64;
            Ok::<_, ChunkVaultError>((raw_len, range_checksum, raw, false))
        }
    })
    .await
    .map_err(|e| ChunkVaultError::transient_io(format!("chunk compute task panicked: {e}")))??;

    let chunk_id = ChunkId::new(file_id, sequence);
    let storage_path = provider.put(&chunk_id, &payload, correlation_id).await?;

    Ok(ChunkRecord::new(
        file_id.clone(),
        sequence,
        raw_size,
        payload.len() as u64,
        range_checksum,
        is_compressed,
        provider.provider_id().to_string(),
        storage_path,
        correlation_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_bus::InProcessEventBus;
    use crate::infrastructure::providers::FilesystemProvider;
    use chunkvault_domain::services::{PassthroughCompressionService, Sha256ChecksumService};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn engine_with(
        providers: Vec<Arc<dyn StorageProvider>>,
        file_repo: Arc<dyn FileRepository>,
        chunk_repo: Arc<dyn ChunkRepository>,
        compression: Arc<dyn CompressionService>,
        config: ChunkEngineConfig,
    ) -> ChunkEngine<InProcessEventBus> {
        let bus = Arc::new(InProcessEventBus::new(Arc::new(crate::infrastructure::event_bus::HandlerRegistry::new())));
        ChunkEngine::new(
            providers,
            file_repo,
            chunk_repo,
            Arc::new(Sha256ChecksumService),
            compression,
            bus,
            config,
            Arc::new(ChunkVaultMetrics::new().unwrap()),
        )
    }

    // Minimal in-memory stand-ins for the two repository ports, enough to
    // exercise the engine without a real sqlite pool.
    #[derive(Default)]
    struct MemFileRepo(std::sync::Mutex<HashMap<String, FileRecord>>);
    #[async_trait::async_trait]
    impl FileRepository for MemFileRepo {
        async fn get(&self, id: &FileId, _correlation_id: CorrelationId) -> Result<FileRecord, ChunkVaultError> {
            self.0
                .lock()
                .unwrap()
                .get(id.as_str())
                .cloned()
                .ok_or_else(|| ChunkVaultError::not_found(id.to_string()))
        }
        async fn list(
            &self,
            _filter: chunkvault_domain::repositories::FileFilter,
            _correlation_id: CorrelationId,
        ) -> Result<Vec<FileRecord>, ChunkVaultError> {
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
    struct MemChunkRepo(std::sync::Mutex<HashMap<String, ChunkRecord>>);
    #[async_trait::async_trait]
    impl ChunkRepository for MemChunkRepo {
        async fn get(&self, file_id: &FileId, sequence_number: u32, _correlation_id: CorrelationId) -> Result<ChunkRecord, ChunkVaultError> {
            self.0
                .lock()
                .unwrap()
                .get(ChunkId::new(file_id, sequence_number).as_str())
                .cloned()
                .ok_or_else(|| ChunkVaultError::not_found("no such chunk"))
        }
        async fn get_by_id(&self, chunk_id: &ChunkId, _correlation_id: CorrelationId) -> Result<ChunkRecord, ChunkVaultError> {
            self.0
                .lock()
                .unwrap()
                .get(chunk_id.as_str())
                .cloned()
                .ok_or_else(|| ChunkVaultError::not_found("no such chunk"))
        }
        async fn add(&self, record: &ChunkRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn replace(&self, record: &ChunkRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn delete(&self, file_id: &FileId, sequence_number: u32, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().remove(ChunkId::new(file_id, sequence_number).as_str());
            Ok(())
        }
        async fn list_by_file(&self, file_id: &FileId, _correlation_id: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError> {
            let prefix = format!("{}_", file_id.as_str());
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.id.as_str().starts_with(&prefix))
                .cloned()
                .collect())
        }
        async fn delete_by_file(&self, file_id: &FileId, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            let prefix = format!("{}_", file_id.as_str());
            self.0.lock().unwrap().retain(|id, _| !id.starts_with(&prefix));
            Ok(())
        }
        async fn list_all(&self, _correlation_id: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError> {
            Ok(self.0.lock().unwrap().values().cloned().collect())
        }
    }

    fn write_temp_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn optimal_chunk_size_delegates_to_domain_policy() {
        let engine = engine_with(
            vec![],
            Arc::new(MemFileRepo::default()),
            Arc::new(MemChunkRepo::default()),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig::default(),
        );
        let config = ChunkEngineConfig::default().chunk_size;
        assert_eq!(engine.optimal_chunk_size(0).bytes(), optimal_for_file_size(0, config).bytes());
    }

    #[tokio::test]
    async fn split_then_merge_round_trips_a_single_chunk_file() {
        let dir = tempdir().unwrap();
        let source = write_temp_file(&dir, "small.bin", b"a small payload, well under one mebibyte");

        let provider: Arc<dyn StorageProvider> =
            Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(MemChunkRepo::default());
        let engine = engine_with(
            vec![provider],
            Arc::clone(&file_repo),
            Arc::clone(&chunk_repo),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig {
                compression_enabled: false,
                ..ChunkEngineConfig::default()
            },
        );

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let file_id = FileId::new();
        let record = engine
            .split(&source, file_id.clone(), "small.bin", correlation_id, &cancellation)
            .await
            .unwrap();
        assert_eq!(record.chunk_count, 1);
        assert_eq!(record.status, chunkvault_domain::value_objects::LifecycleStatus::Completed);

        let mut sink = Cursor::new(Vec::new());
        let ok = engine.merge(&file_id, &mut sink, correlation_id, &cancellation).await.unwrap();
        assert!(ok);
        assert_eq!(sink.into_inner(), std::fs::read(&source).unwrap());
    }

    #[tokio::test]
    async fn split_then_merge_round_trips_a_multi_chunk_compressed_file() {
        let dir = tempdir().unwrap();
        let payload = b"0123456789abcdef".repeat(100_000); // ~1.6 MiB, spans multiple chunks
        let source = write_temp_file(&dir, "large.bin", &payload);

        let provider: Arc<dyn StorageProvider> =
            Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(MemChunkRepo::default());
        let engine = engine_with(
            vec![provider],
            Arc::clone(&file_repo),
            Arc::clone(&chunk_repo),
            Arc::new(crate::infrastructure::compression::GzipCompressionService),
            ChunkEngineConfig::default(),
        );

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let file_id = FileId::new();
        let record = engine
            .split(&source, file_id.clone(), "large.bin", correlation_id, &cancellation)
            .await
            .unwrap();
        assert!(record.chunk_count > 1, "expected more than one chunk for a 1.6 MiB file");

        let mut sink = Cursor::new(Vec::new());
        let ok = engine.merge(&file_id, &mut sink, correlation_id, &cancellation).await.unwrap();
        assert!(ok);
        assert_eq!(sink.into_inner(), payload);
    }

    #[tokio::test]
    async fn merge_and_verify_confirms_matching_checksum() {
        let dir = tempdir().unwrap();
        let source = write_temp_file(&dir, "verify-me.bin", b"verify this content end to end");

        let provider: Arc<dyn StorageProvider> =
            Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(MemChunkRepo::default());
        let engine = engine_with(
            vec![provider],
            Arc::clone(&file_repo),
            Arc::clone(&chunk_repo),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig::default(),
        );

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let file_id = FileId::new();
        engine
            .split(&source, file_id.clone(), "verify-me.bin", correlation_id, &cancellation)
            .await
            .unwrap();

        let mut sink = Cursor::new(Vec::new());
        let verified = engine
            .merge_and_verify(&file_id, &mut sink, correlation_id, true, &cancellation)
            .await
            .unwrap();
        assert!(verified);
    }

    #[tokio::test]
    async fn merge_and_verify_detects_a_tampered_checksum() {
        let dir = tempdir().unwrap();
        let source = write_temp_file(&dir, "tamper.bin", b"original content");

        let provider: Arc<dyn StorageProvider> =
            Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(MemChunkRepo::default());
        let engine = engine_with(
            vec![provider],
            Arc::clone(&file_repo),
            Arc::clone(&chunk_repo),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig::default(),
        );

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let file_id = FileId::new();
        let mut record = engine
            .split(&source, file_id.clone(), "tamper.bin", correlation_id, &cancellation)
            .await
            .unwrap();
        record.checksum = chunkvault_domain::value_objects::Checksum::from_hex("0".repeat(64));
        file_repo.replace(&record, correlation_id).await.unwrap();

        let mut sink = Cursor::new(Vec::new());
        let verified = engine
            .merge_and_verify(&file_id, &mut sink, correlation_id, true, &cancellation)
            .await
            .unwrap();
        assert!(!verified);
    }

    #[tokio::test]
    async fn merge_of_unknown_file_returns_false_rather_than_erroring() {
        let engine = engine_with(
            vec![],
            Arc::new(MemFileRepo::default()),
            Arc::new(MemChunkRepo::default()),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig::default(),
        );
        let mut sink = Cursor::new(Vec::new());
        let ok = engine
            .merge(&FileId::from_string("missing"), &mut sink, CorrelationId::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn delete_removes_chunk_bytes_and_both_records() {
        let dir = tempdir().unwrap();
        let source = write_temp_file(&dir, "to-delete.bin", b"bytes that will be deleted");

        let provider: Arc<dyn StorageProvider> =
            Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(MemChunkRepo::default());
        let engine = engine_with(
            vec![Arc::clone(&provider)],
            Arc::clone(&file_repo),
            Arc::clone(&chunk_repo),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig::default(),
        );

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let file_id = FileId::new();
        engine
            .split(&source, file_id.clone(), "to-delete.bin", correlation_id, &cancellation)
            .await
            .unwrap();

        let deleted = engine.delete(&file_id, correlation_id).await.unwrap();
        assert!(deleted);
        assert!(chunk_repo.list_by_file(&file_id, correlation_id).await.unwrap().is_empty());
        assert!(file_repo.get(&file_id, correlation_id).await.is_err());
    }

    #[tokio::test]
    async fn places_chunks_round_robin_across_providers_in_configured_order() {
        // Spec §8 concrete scenario: two providers [filesystem, objectstore]
        // (here, two distinct filesystem roots standing in for two distinct
        // backends) and a 3-chunk file — chunks 0 and 2 land on the first
        // provider, chunk 1 on the second.
        let dir = tempdir().unwrap();
        let chunk_size = 10u64;
        let payload = vec![7u8; (chunk_size * 3) as usize]; // exactly 3 chunks
        let source = write_temp_file(&dir, "round-robin.bin", &payload);

        let provider_a: Arc<dyn StorageProvider> = Arc::new(FilesystemProvider::new("provider-a", dir.path().join("a")));
        let provider_b: Arc<dyn StorageProvider> = Arc::new(FilesystemProvider::new("provider-b", dir.path().join("b")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(MemChunkRepo::default());
        let engine = engine_with(
            vec![Arc::clone(&provider_a), Arc::clone(&provider_b)],
            Arc::clone(&file_repo),
            Arc::clone(&chunk_repo),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig {
                chunk_size: ChunkSizeConfig {
                    min: chunk_size,
                    max: chunk_size,
                    default: chunk_size,
                },
                compression_enabled: false,
                ..ChunkEngineConfig::default()
            },
        );

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let file_id = FileId::new();
        let record = engine
            .split(&source, file_id.clone(), "round-robin.bin", correlation_id, &cancellation)
            .await
            .unwrap();
        assert_eq!(record.chunk_count, 3);

        let mut chunks = chunk_repo.list_by_file(&file_id, correlation_id).await.unwrap();
        chunks.sort_by_key(|c| c.sequence_number);
        assert_eq!(chunks[0].storage_provider_id, "provider-a");
        assert_eq!(chunks[1].storage_provider_id, "provider-b");
        assert_eq!(chunks[2].storage_provider_id, "provider-a");
    }

    #[tokio::test]
    async fn delete_chunk_removes_bytes_then_record() {
        let dir = tempdir().unwrap();
        let source = write_temp_file(&dir, "one-chunk.bin", b"a single chunk of bytes");

        let provider: Arc<dyn StorageProvider> =
            Arc::new(FilesystemProvider::new("filesystem", dir.path().join("blobs")));
        let file_repo: Arc<dyn FileRepository> = Arc::new(MemFileRepo::default());
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(MemChunkRepo::default());
        let engine = engine_with(
            vec![provider],
            Arc::clone(&file_repo),
            Arc::clone(&chunk_repo),
            Arc::new(PassthroughCompressionService),
            ChunkEngineConfig::default(),
        );

        let correlation_id = CorrelationId::new();
        let cancellation = CancellationToken::new();
        let file_id = FileId::new();
        engine
            .split(&source, file_id.clone(), "one-chunk.bin", correlation_id, &cancellation)
            .await
            .unwrap();

        let chunk_id = ChunkId::new(&file_id, 0);
        let deleted = engine.delete_chunk(&chunk_id, correlation_id).await.unwrap();
        assert!(deleted);
        assert!(chunk_repo.get_by_id(&chunk_id, correlation_id).await.is_err());
    }
}

// Property-based check for spec §8 property 8 ("round-robin placement"):
// for any number of providers and any number of sequential `next_provider()`
// calls, call `i` always lands on provider `i mod k`, regardless of how many
// providers are configured.
#[cfg(test)]
mod round_robin_proptests {
    use super::*;
    use crate::infrastructure::event_bus::InProcessEventBus;
    use chunkvault_domain::services::{PassthroughCompressionService, Sha256ChecksumService};
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct NoopFileRepo;
    #[async_trait::async_trait]
    impl FileRepository for NoopFileRepo {
        async fn get(&self, id: &FileId, _c: CorrelationId) -> Result<FileRecord, ChunkVaultError> {
            Err(ChunkVaultError::not_found(id.to_string()))
        }
        async fn list(&self, _f: chunkvault_domain::repositories::FileFilter, _c: CorrelationId) -> Result<Vec<FileRecord>, ChunkVaultError> {
            Ok(vec![])
        }
        async fn add(&self, _r: &FileRecord, _c: CorrelationId) -> Result<(), ChunkVaultError> {
            Ok(())
        }
        async fn replace(&self, _r: &FileRecord, _c: CorrelationId) -> Result<(), ChunkVaultError> {
            Ok(())
        }
        async fn delete(&self, _id: &FileId, _c: CorrelationId) -> Result<(), ChunkVaultError> {
            Ok(())
        }
    }

    struct NoopChunkRepo;
    #[async_trait::async_trait]
    impl ChunkRepository for NoopChunkRepo {
        async fn get(&self, _f: &FileId, _s: u32, _c: CorrelationId) -> Result<ChunkRecord, ChunkVaultError> {
            Err(ChunkVaultError::not_found("none"))
        }
        async fn get_by_id(&self, _id: &ChunkId, _c: CorrelationId) -> Result<ChunkRecord, ChunkVaultError> {
            Err(ChunkVaultError::not_found("none"))
        }
        async fn add(&self, _r: &ChunkRecord, _c: CorrelationId) -> Result<(), ChunkVaultError> {
            Ok(())
        }
        async fn replace(&self, _r: &ChunkRecord, _c: CorrelationId) -> Result<(), ChunkVaultError> {
            Ok(())
        }
        async fn delete(&self, _f: &FileId, _s: u32, _c: CorrelationId) -> Result<(), ChunkVaultError> {
            Ok(())
        }
        async fn list_by_file(&self, _f: &FileId, _c: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError> {
            Ok(vec![])
        }
        async fn delete_by_file(&self, _f: &FileId, _c: CorrelationId) -> Result<(), ChunkVaultError> {
            Ok(())
        }
        async fn list_all(&self, _c: CorrelationId) -> Result<Vec<ChunkRecord>, ChunkVaultError> {
            Ok(vec![])
        }
    }

    fn engine_with_n_providers(n: usize) -> ChunkEngine<InProcessEventBus> {
        let providers: Vec<Arc<dyn StorageProvider>> = (0..n)
            .map(|i| -> Arc<dyn StorageProvider> {
                Arc::new(crate::infrastructure::providers::FilesystemProvider::new(
                    format!("provider-{i}"),
                    std::env::temp_dir().join(format!("chunkvault-proptest-{i}")),
                ))
            })
            .collect();
        let bus = Arc::new(InProcessEventBus::new(Arc::new(crate::infrastructure::event_bus::HandlerRegistry::new())));
        ChunkEngine::new(
            providers,
            Arc::new(NoopFileRepo),
            Arc::new(NoopChunkRepo),
            Arc::new(Sha256ChecksumService),
            Arc::new(PassthroughCompressionService),
            bus,
            ChunkEngineConfig::default(),
            Arc::new(ChunkVaultMetrics::new().unwrap()),
        )
    }

    proptest! {
        #[test]
        fn sequential_calls_land_on_provider_i_mod_k(provider_count in 1usize..8, call_count in 0usize..40) {
            let engine = engine_with_n_providers(provider_count);
            let mut seen: HashMap<usize, String> = HashMap::new();
            for i in 0..call_count {
                let provider = engine.next_provider().unwrap();
                let expected_index = i % provider_count;
                let entry = seen.entry(expected_index).or_insert_with(|| provider.provider_id().to_string());
                prop_assert_eq!(&provider.provider_id().to_string(), entry);
                prop_assert_eq!(provider.provider_id(), format!("provider-{expected_index}"));
            }
        }
    }
}
