// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Use case for the CLI `seek-plus` command: a directory scan that also
//! hashes file content and optionally tags duplicates (spec §4.H).

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chunkvault_domain::repositories::EventBus;
use chunkvault_domain::value_objects::CancellationToken;
use tracing::info;

use crate::application::services::DirectoryIndexer;
use crate::application::services::directory_indexer::IndexReport;

/// `parallel` is accepted for CLI compatibility; the indexer's worker pool
/// is always sized to the available CPUs regardless of this flag.
pub struct SeekDirectoryPlusUseCase<B: EventBus> {
    indexer: Arc<DirectoryIndexer<B>>,
}

impl<B: EventBus> SeekDirectoryPlusUseCase<B> {
    pub fn new(indexer: Arc<DirectoryIndexer<B>>) -> Self {
        Self { indexer }
    }

    pub async fn execute(
        &self,
        path: &Path,
        process_content: bool,
        _parallel: bool,
        check_duplicates: bool,
        cancellation: &CancellationToken,
    ) -> Result<IndexReport> {
        let correlation_id = chunkvault_domain::value_objects::CorrelationId::new();
        let report = self
            .indexer
            .index(path, true, process_content, check_duplicates, correlation_id, cancellation)
            .await?;

        let duplicate_count = report.records.iter().filter(|record| record.is_duplicate()).count();

        info!(
            path = %path.display(),
            files = report.file_count,
            directories = report.directory_count,
            duplicates = duplicate_count,
            "scanned directory with content hashing"
        );
        println!(
            "Scanned {}: {} files, {} directories, {} bytes, {} duplicates",
            path.display(),
            report.file_count,
            report.directory_count,
            report.total_size,
            duplicate_count
        );

        Ok(report)
    }
}
