// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Use case for the CLI `upload` command.

use std::path::Path;
use std::sync::Arc;

use chunkvault_domain::entities::FileRecord;
use chunkvault_domain::repositories::EventBus;
use chunkvault_domain::value_objects::CancellationToken;
use tracing::info;

use crate::application::services::FileService;

/// Splits a file into chunks and registers it with the vault.
///
/// # Errors
/// Returns an error if the source file cannot be read, or if any chunk
/// fails to reach a storage provider. On failure no partial file record is
/// left behind in `Completed` status — the engine marks it `Failed`.
///
/// # Example output
/// ```text
/// Uploaded 'report.pdf' as 01J9Z... (7 chunks, 4.20 MiB)
/// ```
pub struct UploadFileUseCase<B: EventBus> {
    file_service: Arc<FileService<B>>,
}

impl<B: EventBus> UploadFileUseCase<B> {
    pub fn new(file_service: Arc<FileService<B>>) -> Self {
        Self { file_service }
    }

    pub async fn execute(&self, file_path: &Path, cancellation: &CancellationToken) -> anyhow::Result<FileRecord> {
        let correlation_id = chunkvault_domain::value_objects::CorrelationId::new();
        let record = self.file_service.upload(file_path, None, correlation_id, cancellation).await?;

        info!(
            file_id = %record.id.as_str(),
            chunk_count = record.chunk_count,
            bytes = record.original_length,
            "uploaded file"
        );
        println!(
            "Uploaded '{}' as {} ({} chunks, {} bytes)",
            record.display_name,
            record.id.as_str(),
            record.chunk_count,
            record.original_length
        );

        Ok(record)
    }
}
