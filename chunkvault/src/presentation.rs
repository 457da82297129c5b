// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Composition Root
//!
//! Wires a [`ChunkVaultConfig`] into a running set of application services:
//! storage providers, the SQLite-backed metadata repositories, the TTL
//! cache, the in-process event bus, `ChunkEngine`, `FileService`, and
//! `DirectoryIndexer`. This is the one place in the crate that knows every
//! concrete infrastructure type; everything above it only sees ports.
//!
//! The binary entry point (`src/main.rs`) calls [`CompositionRoot::build`]
//! once at startup, then dispatches each CLI command to the matching
//! use case.

use std::sync::Arc;
use std::time::Duration;

use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::repositories::{ChunkRepository, FileRepository, LogRepository, StorageProvider};
use chunkvault_domain::services::Sha256ChecksumService;
use chunkvault_domain::value_objects::CompressionLevel;

use crate::application::use_cases::{
    DeleteFileUseCase, DownloadFileUseCase, ListFilesUseCase, SeekDirectoryPlusUseCase, SeekDirectoryUseCase,
    ShowMetricsUseCase, UploadFileUseCase, VerifyFileUseCase,
};
use crate::application::{DirectoryIndexer, FileService};
use crate::infrastructure::chunk_engine::ChunkEngineConfig;
use crate::infrastructure::event_bus::{HandlerRegistry, InProcessEventBus};
use crate::infrastructure::metadata_store::{SqliteChunkRepository, SqliteFileRepository, SqliteLogRepository};
use crate::infrastructure::providers::{FilesystemProvider, GridFsProvider, RemoteObjectProvider};
use crate::infrastructure::repositories::initialize_database;
use crate::infrastructure::{ChunkEngine, ChunkVaultConfig, ChunkVaultMetrics, GzipCompressionService, LogsConfig, TtlCache};

/// Every running service the application layer needs, built once from a
/// resolved [`ChunkVaultConfig`].
pub struct CompositionRoot {
    pub chunk_engine: Arc<ChunkEngine<InProcessEventBus>>,
    pub file_service: Arc<FileService<InProcessEventBus>>,
    pub directory_indexer: Arc<DirectoryIndexer<InProcessEventBus>>,
    pub log_repo: Arc<SqliteLogRepository>,
    pub metrics: Arc<ChunkVaultMetrics>,
    /// Background sweep enforcing `config.logs.retention_days` (§4.B); kept
    /// alive for the process lifetime and aborted on drop.
    log_sweep_task: tokio::task::JoinHandle<()>,
}

impl Drop for CompositionRoot {
    fn drop(&mut self) {
        self.log_sweep_task.abort();
    }
}

impl CompositionRoot {
    /// Builds every service from `config`. Opens (and migrates, if
    /// missing) the SQLite database, constructs whichever storage
    /// providers are listed in `config.providers.enabled`, and wires them
    /// all into the chunk engine and the two application services.
    pub async fn build(config: &ChunkVaultConfig, max_parallel_tasks_override: Option<usize>) -> Result<Self, ChunkVaultError> {
        let pool = initialize_database(&config.store.database_url)
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("failed to initialize database: {e}")))?;

        let file_repo: Arc<dyn FileRepository> = Arc::new(SqliteFileRepository::new(pool.clone()));
        let chunk_repo: Arc<dyn ChunkRepository> = Arc::new(SqliteChunkRepository::new(pool.clone()));
        let log_repo = Arc::new(SqliteLogRepository::new(pool.clone()));

        let providers = build_providers(config, &pool).await?;

        let event_bus = Arc::new(InProcessEventBus::new(Arc::new(HandlerRegistry::new())));

        let metrics = Arc::new(ChunkVaultMetrics::new().map_err(|e| ChunkVaultError::invariant(format!("failed to register metrics: {e}")))?);

        let engine_config = ChunkEngineConfig {
            chunk_size: chunkvault_domain::value_objects::ChunkSizeConfig {
                min: config.chunking.min_chunk_size_in_bytes,
                max: config.chunking.max_chunk_size_in_bytes,
                default: config.chunking.default_chunk_size_in_bytes,
            },
            compression_enabled: config.chunking.compression_enabled,
            compression_level: CompressionLevel::new(config.chunking.compression_level),
            max_parallel_tasks: max_parallel_tasks_override.unwrap_or(config.distribution.max_parallel_tasks),
            ..ChunkEngineConfig::default()
        };

        let chunk_engine = Arc::new(ChunkEngine::new(
            providers,
            Arc::clone(&file_repo),
            chunk_repo,
            Arc::new(Sha256ChecksumService),
            Arc::new(GzipCompressionService),
            Arc::clone(&event_bus),
            engine_config,
            Arc::clone(&metrics),
        ));

        let cache = Arc::new(TtlCache::new(Duration::from_secs(config.cache.default_expiry_in_minutes * 60)));
        let file_service = Arc::new(FileService::new(
            Arc::clone(&chunk_engine),
            Arc::clone(&file_repo),
            cache,
            Duration::from_secs(config.cache.default_expiry_in_minutes * 60),
            Arc::clone(&metrics),
        ));

        let directory_indexer = Arc::new(DirectoryIndexer::new(file_repo, Arc::new(Sha256ChecksumService), event_bus));

        let log_sweep_task = spawn_log_sweep(Arc::clone(&log_repo), &config.logs);

        Ok(Self {
            chunk_engine,
            file_service,
            directory_indexer,
            log_repo,
            metrics,
            log_sweep_task,
        })
    }

    pub fn upload_use_case(&self) -> UploadFileUseCase<InProcessEventBus> {
        UploadFileUseCase::new(Arc::clone(&self.file_service))
    }

    pub fn download_use_case(&self) -> DownloadFileUseCase<InProcessEventBus> {
        DownloadFileUseCase::new(Arc::clone(&self.file_service))
    }

    pub fn list_use_case(&self) -> ListFilesUseCase<InProcessEventBus> {
        ListFilesUseCase::new(Arc::clone(&self.file_service))
    }

    pub fn delete_use_case(&self) -> DeleteFileUseCase<InProcessEventBus> {
        DeleteFileUseCase::new(Arc::clone(&self.file_service))
    }

    pub fn verify_use_case(&self) -> VerifyFileUseCase<InProcessEventBus> {
        VerifyFileUseCase::new(Arc::clone(&self.file_service))
    }

    pub fn seek_use_case(&self) -> SeekDirectoryUseCase<InProcessEventBus> {
        SeekDirectoryUseCase::new(Arc::clone(&self.directory_indexer))
    }

    pub fn seek_plus_use_case(&self) -> SeekDirectoryPlusUseCase<InProcessEventBus> {
        SeekDirectoryPlusUseCase::new(Arc::clone(&self.directory_indexer))
    }

    pub fn metrics_use_case(&self) -> ShowMetricsUseCase {
        ShowMetricsUseCase::new(Arc::clone(&self.metrics))
    }
}

/// Constructs one [`StorageProvider`] per id in `config.providers.enabled`,
/// in order — that order fixes round-robin placement (spec §4.F step 6b).
async fn build_providers(config: &ChunkVaultConfig, pool: &sqlx::SqlitePool) -> Result<Vec<Arc<dyn StorageProvider>>, ChunkVaultError> {
    let mut providers: Vec<Arc<dyn StorageProvider>> = Vec::with_capacity(config.providers.enabled.len());

    for provider_id in &config.providers.enabled {
        let provider: Arc<dyn StorageProvider> = match provider_id.as_str() {
            "filesystem" => {
                let base_path = config.providers.settings.filesystem_base_path.clone().unwrap_or_else(|| "./chunkvault-data".to_string());
                Arc::new(FilesystemProvider::new(provider_id.clone(), base_path))
            }
            "objectstore" => Arc::new(GridFsProvider::new(provider_id.clone(), pool.clone())),
            "remote" => {
                let bucket = config
                    .providers
                    .settings
                    .remote_bucket_name
                    .clone()
                    .ok_or_else(|| ChunkVaultError::invariant("remote provider enabled but RemoteBucketName is not set"))?;
                let key_prefix = config.providers.settings.remote_key_prefix.clone().unwrap_or_default();
                let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let client = aws_sdk_s3::Client::new(&sdk_config);
                Arc::new(RemoteObjectProvider::new(
                    provider_id.clone(),
                    client,
                    bucket,
                    key_prefix,
                    config.providers.settings.remote_server_side_encryption,
                ))
            }
            other => return Err(ChunkVaultError::invariant(format!("unknown storage provider id: {other}"))),
        };
        providers.push(provider);
    }

    if providers.is_empty() {
        return Err(ChunkVaultError::invariant("no storage providers enabled"));
    }

    Ok(providers)
}

/// Spawns the background sweep that enforces `config.logs.retention_days`
/// against the `logs` collection (§4.B) — SQLite has no native TTL index,
/// so the horizon is enforced here on an interval instead. Runs once
/// immediately, then every `sweep_interval_minutes`, for the life of the
/// process.
fn spawn_log_sweep(log_repo: Arc<SqliteLogRepository>, logs_config: &LogsConfig) -> tokio::task::JoinHandle<()> {
    let retention_days = logs_config.retention_days;
    let interval = Duration::from_secs(logs_config.sweep_interval_minutes.max(1) * 60);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let horizon = chrono::Utc::now() - chrono::Duration::days(retention_days);
            match log_repo.prune_older_than(horizon).await {
                Ok(pruned) => {
                    if pruned > 0 {
                        tracing::debug!(pruned, retention_days, "pruned expired log records");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "log retention sweep failed"),
            }
        }
    })
}
