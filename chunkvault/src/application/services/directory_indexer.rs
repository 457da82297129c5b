// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! DirectoryIndexer (spec §4.H): walks a directory tree, records a `File`
//! or `Directory` entry per entry, optionally hashes file content, and
//! tags duplicate content. Parallel content hashing is bounded by a worker
//! pool sized to the number of logical CPUs.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chunkvault_domain::entities::{FileKind, FileRecord};
use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::events::{DirectoryScan, FileDiscovered};
use chunkvault_domain::repositories::{EventBus, FileFilter, FileRepository};
use chunkvault_domain::services::ChecksumService;
use chunkvault_domain::value_objects::{CancellationToken, CorrelationId, FileId};
use tokio::sync::Semaphore;
use walkdir::WalkDir;

/// Result of one full directory scan: the records touched and the summary
/// counters the `DirectoryScan` event also carries.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub records: Vec<FileRecord>,
    pub file_count: u64,
    pub directory_count: u64,
    pub total_size: u64,
    pub error_count: u64,
}

pub struct DirectoryIndexer<B: EventBus> {
    file_repo: Arc<dyn FileRepository>,
    checksum: Arc<dyn ChecksumService>,
    event_bus: Arc<B>,
    worker_pool_size: usize,
}

impl<B: EventBus> DirectoryIndexer<B> {
    pub fn new(file_repo: Arc<dyn FileRepository>, checksum: Arc<dyn ChecksumService>, event_bus: Arc<B>) -> Self {
        let worker_pool_size = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self {
            file_repo,
            checksum,
            event_bus,
            worker_pool_size,
        }
    }

    /// Walks `path`. `recursive` controls whether subdirectories are
    /// descended into; `process_content` additionally hashes `File`
    /// entries and stamps `isIndexed`; `check_duplicates` runs the
    /// post-indexing duplicate-tagging pass (spec §4.H, only ever run
    /// after content hashing, since it groups by checksum).
    pub async fn index(
        &self,
        path: &Path,
        recursive: bool,
        process_content: bool,
        check_duplicates: bool,
        correlation_id: CorrelationId,
        cancellation: &CancellationToken,
    ) -> Result<IndexReport, ChunkVaultError> {
        let started_at = Instant::now();
        cancellation.check()?;

        let max_depth = if recursive { usize::MAX } else { 1 };
        let entries: Vec<walkdir::DirEntry> = WalkDir::new(path)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path() != path)
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.worker_pool_size));
        let mut tasks = Vec::with_capacity(entries.len());
        let checksum_service = Arc::clone(&self.checksum);

        for entry in entries {
            cancellation.check()?;
            let semaphore = Arc::clone(&semaphore);
            let checksum_service = Arc::clone(&checksum_service);
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                index_one_entry(entry, process_content, &checksum_service)
            }));
        }

        let mut records = Vec::with_capacity(tasks.len());
        let mut file_count = 0u64;
        let mut directory_count = 0u64;
        let mut total_size = 0u64;
        let mut error_count = 0u64;

        for task in tasks {
            match task.await {
                Ok(Some((mut record, was_processed))) => {
                    record.correlation_id = correlation_id;
                    match record.kind {
                        FileKind::File => {
                            file_count += 1;
                            total_size += record.original_length;
                        }
                        FileKind::Directory => directory_count += 1,
                    }
                    if self.file_repo.add(&record, correlation_id).await.is_err() {
                        self.file_repo.replace(&record, correlation_id).await?;
                    }

                    self.event_bus
                        .publish(FileDiscovered {
                            event_id: uuid::Uuid::new_v4(),
                            file_id: record.id.as_str().to_string(),
                            file_path: record.full_path.clone().unwrap_or_default(),
                            file_name: record.display_name.clone(),
                            file_size: record.original_length,
                            extension: record.extension.clone(),
                            content_type: record.content_type.clone(),
                            checksum: if record.is_indexed { Some(record.checksum.as_hex().to_string()) } else { None },
                            was_processed,
                            chunk_count: record.chunk_count,
                            status: format!("{:?}", record.status),
                            parent_id: record.parent_id.as_ref().map(|id| id.as_str().to_string()),
                            tags: record.tags.iter().cloned().collect(),
                            elapsed_ms: started_at.elapsed().as_millis() as u64,
                            correlation_id,
                            timestamp: chrono::Utc::now(),
                        })
                        .await;

                    records.push(record);
                }
                Ok(None) => error_count += 1,
                Err(_) => error_count += 1,
            }
        }

        if check_duplicates {
            self.tag_duplicates(&mut records, correlation_id).await?;
        }

        self.event_bus
            .publish(DirectoryScan {
                event_id: uuid::Uuid::new_v4(),
                path: path.to_string_lossy().into_owned(),
                file_count,
                directory_count,
                total_size,
                processed_content: process_content,
                recursive,
                elapsed_ms: started_at.elapsed().as_millis() as u64,
                chunk_count: 0,
                error_count,
                correlation_id,
                timestamp: chrono::Utc::now(),
            })
            .await;

        Ok(IndexReport {
            records,
            file_count,
            directory_count,
            total_size,
            error_count,
        })
    }

    /// Groups `records` by non-empty checksum; any checksum shared by more
    /// than one record gets every member tagged `duplicate` and persisted.
    /// The only post-indexing mutation the indexer performs (§4.H).
    async fn tag_duplicates(&self, records: &mut [FileRecord], correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
        use std::collections::HashMap;

        let mut by_checksum: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            if record.is_indexed && !record.checksum.as_hex().is_empty() {
                by_checksum.entry(record.checksum.as_hex().to_string()).or_default().push(idx);
            }
        }

        for indices in by_checksum.values().filter(|indices| indices.len() > 1) {
            for &idx in indices {
                records[idx].add_tag("duplicate");
                self.file_repo.replace(&records[idx], correlation_id).await?;
            }
        }
        Ok(())
    }

    pub async fn list_indexed(&self, parent_id: Option<FileId>, correlation_id: CorrelationId) -> Result<Vec<FileRecord>, ChunkVaultError> {
        self.file_repo
            .list(
                FileFilter {
                    parent_id,
                    ..Default::default()
                },
                correlation_id,
            )
            .await
    }
}

/// Builds the record for one walked entry, optionally hashing its content.
/// Returns `None` on unreadable metadata (permission errors etc.) — logged
/// by the caller as a scan error, not propagated as a fatal failure.
fn index_one_entry(
    entry: walkdir::DirEntry,
    process_content: bool,
    checksum_service: &Arc<dyn ChecksumService>,
) -> Option<(FileRecord, bool)> {
    let metadata = entry.metadata().ok()?;
    let full_path = entry.path().to_string_lossy().into_owned();
    let display_name = entry.file_name().to_string_lossy().into_owned();
    let kind = if metadata.is_dir() { FileKind::Directory } else { FileKind::File };
    let extension = entry.path().extension().map(|ext| ext.to_string_lossy().to_lowercase());
    let content_type = extension.as_deref().map(guess_content_type).map(str::to_string);

    let mut record = FileRecord::new_directory_entry(
        FileId::new(),
        kind,
        display_name,
        full_path,
        metadata.len(),
        content_type,
        extension,
        None,
        CorrelationId::new(),
    );

    let mut was_processed = false;
    if process_content && kind == FileKind::File {
        if let Ok(bytes) = std::fs::read(entry.path()) {
            let checksum = checksum_service.checksum_bytes(&bytes);
            record.mark_indexed(checksum);
            was_processed = true;
        }
    }

    Some((record, was_processed))
}

/// A small fixed extension-to-MIME-type table; good enough for the
/// indexer's "content-type guess by extension" requirement without
/// pulling in a dedicated crate for it.
fn guess_content_type(extension: &str) -> &'static str {
    match extension {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_bus::{HandlerRegistry, InProcessEventBus};
    use chunkvault_domain::services::Sha256ChecksumService;
    use chunkvault_domain::value_objects::FileId as DomainFileId;
    use std::collections::HashMap as StdHashMap;

    #[derive(Default)]
    struct MemFileRepo(std::sync::Mutex<StdHashMap<String, FileRecord>>);
    #[async_trait::async_trait]
    impl FileRepository for MemFileRepo {
        async fn get(&self, id: &DomainFileId, _correlation_id: CorrelationId) -> Result<FileRecord, ChunkVaultError> {
            self.0.lock().unwrap().get(id.as_str()).cloned().ok_or_else(|| ChunkVaultError::not_found(id.to_string()))
        }
        async fn list(&self, _filter: FileFilter, _correlation_id: CorrelationId) -> Result<Vec<FileRecord>, ChunkVaultError> {
            Ok(self.0.lock().unwrap().values().cloned().collect())
        }
        async fn add(&self, record: &FileRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            let mut guard = self.0.lock().unwrap();
            if guard.contains_key(record.id.as_str()) {
                return Err(ChunkVaultError::invariant("already exists"));
            }
            guard.insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn replace(&self, record: &FileRecord, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().insert(record.id.as_str().to_string(), record.clone());
            Ok(())
        }
        async fn delete(&self, id: &DomainFileId, _correlation_id: CorrelationId) -> Result<(), ChunkVaultError> {
            self.0.lock().unwrap().remove(id.as_str());
            Ok(())
        }
    }

    fn bus() -> Arc<InProcessEventBus> {
        Arc::new(InProcessEventBus::new(Arc::new(HandlerRegistry::new())))
    }

    #[tokio::test]
    async fn indexing_a_directory_with_duplicate_content_tags_both_copies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"same bytes").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"same bytes").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"different bytes").unwrap();

        let indexer = DirectoryIndexer::new(Arc::new(MemFileRepo::default()), Arc::new(Sha256ChecksumService), bus());
        let report = indexer
            .index(dir.path(), false, true, true, CorrelationId::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.file_count, 3);
        let duplicates: Vec<_> = report.records.iter().filter(|r| r.is_duplicate()).collect();
        assert_eq!(duplicates.len(), 2);
    }

    #[tokio::test]
    async fn non_recursive_scan_skips_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("top.txt"), b"top level").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("inner.txt"), b"nested file").unwrap();

        let indexer = DirectoryIndexer::new(Arc::new(MemFileRepo::default()), Arc::new(Sha256ChecksumService), bus());
        let report = indexer
            .index(dir.path(), false, false, false, CorrelationId::new(), &CancellationToken::new())
            .await
            .unwrap();

        // One file (top.txt) and one directory (nested) at depth 1.
        assert_eq!(report.file_count, 1);
        assert_eq!(report.directory_count, 1);
    }

    #[tokio::test]
    async fn recursive_scan_descends_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("inner.txt"), b"nested file").unwrap();

        let indexer = DirectoryIndexer::new(Arc::new(MemFileRepo::default()), Arc::new(Sha256ChecksumService), bus());
        let report = indexer
            .index(dir.path(), true, false, false, CorrelationId::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.file_count, 1);
    }

    #[test]
    fn content_type_guess_covers_common_extensions() {
        assert_eq!(guess_content_type("json"), "application/json");
        assert_eq!(guess_content_type("unknown-ext"), "application/octet-stream");
    }
}
