// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Use case for the CLI `seek` command: a plain directory scan with no
//! content hashing, for quickly cataloguing a tree (spec §4.H).

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chunkvault_domain::repositories::EventBus;
use chunkvault_domain::value_objects::CancellationToken;
use tracing::info;

use crate::application::services::DirectoryIndexer;
use crate::application::services::directory_indexer::IndexReport;

pub struct SeekDirectoryUseCase<B: EventBus> {
    indexer: Arc<DirectoryIndexer<B>>,
}

impl<B: EventBus> SeekDirectoryUseCase<B> {
    pub fn new(indexer: Arc<DirectoryIndexer<B>>) -> Self {
        Self { indexer }
    }

    pub async fn execute(&self, path: &Path, recursive: bool, cancellation: &CancellationToken) -> Result<IndexReport> {
        let correlation_id = chunkvault_domain::value_objects::CorrelationId::new();
        let report = self.indexer.index(path, recursive, false, false, correlation_id, cancellation).await?;

        info!(
            path = %path.display(),
            files = report.file_count,
            directories = report.directory_count,
            "scanned directory"
        );
        println!(
            "Scanned {}: {} files, {} directories, {} bytes",
            path.display(),
            report.file_count,
            report.directory_count,
            report.total_size
        );

        Ok(report)
    }
}
