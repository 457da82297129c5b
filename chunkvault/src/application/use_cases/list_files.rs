// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Use case for the CLI `list` command.

use std::sync::Arc;

use chunkvault_domain::entities::FileRecord;
use chunkvault_domain::repositories::{EventBus, FileFilter};
use chunkvault_domain::value_objects::{CorrelationId, FileId};

use crate::application::services::FileService;

/// Lists known files, optionally narrowed by parent directory, content
/// type, or tag (spec §4.B's `FileFilter`, all conjunctive).
pub struct ListFilesUseCase<B: EventBus> {
    file_service: Arc<FileService<B>>,
}

impl<B: EventBus> ListFilesUseCase<B> {
    pub fn new(file_service: Arc<FileService<B>>) -> Self {
        Self { file_service }
    }

    pub async fn execute(
        &self,
        parent_id: Option<String>,
        content_type: Option<String>,
        tag: Option<String>,
    ) -> anyhow::Result<Vec<FileRecord>> {
        let filter = FileFilter {
            parent_id: parent_id.map(FileId::from_string),
            content_type,
            checksum: None,
            tag,
        };
        let records = self.file_service.list(filter, CorrelationId::new()).await?;

        for record in &records {
            println!(
                "{}\t{}\t{}\t{} bytes\t{:?}",
                record.id.as_str(),
                record.display_name,
                record.content_type.as_deref().unwrap_or("-"),
                record.original_length,
                record.status
            );
        }

        Ok(records)
    }
}
