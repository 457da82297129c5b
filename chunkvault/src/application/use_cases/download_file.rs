// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Use case for the CLI `download` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chunkvault_domain::repositories::EventBus;
use chunkvault_domain::value_objects::{CancellationToken, CorrelationId, FileId};
use tokio::fs::File;
use tracing::info;

use crate::application::services::FileService;

/// Reassembles a previously uploaded file's chunks back to disk.
///
/// `output` defaults to the file's display name in the current directory
/// when not given.
///
/// # Errors
/// Returns an error if the file id is unknown, the output path cannot be
/// created, or any chunk read fails. Returns `Ok(false)` rather than an
/// error when the merge itself reports a recoverable I/O failure (spec §9).
pub struct DownloadFileUseCase<B: EventBus> {
    file_service: Arc<FileService<B>>,
}

impl<B: EventBus> DownloadFileUseCase<B> {
    pub fn new(file_service: Arc<FileService<B>>) -> Self {
        Self { file_service }
    }

    pub async fn execute(&self, file_id: &str, output: Option<PathBuf>, cancellation: &CancellationToken) -> anyhow::Result<bool> {
        let correlation_id = CorrelationId::new();
        let id = FileId::from_string(file_id);
        let record = self.file_service.get(&id, correlation_id).await?;

        let output_path = output.unwrap_or_else(|| Path::new(&record.display_name).to_path_buf());
        let mut sink = File::create(&output_path).await?;

        let ok = self.file_service.download(&id, &mut sink, correlation_id, cancellation).await?;

        if ok {
            info!(file_id = %file_id, output = %output_path.display(), "downloaded file");
            println!("Downloaded {} to {}", file_id, output_path.display());
        } else {
            println!("Download of {} failed", file_id);
        }

        Ok(ok)
    }
}
