// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Delete File Use Case
//!
//! Deletes a file and all of its chunks from the vault, with a
//! confirmation prompt unless `--force` is given (spec §6 CLI surface).

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use chunkvault_domain::repositories::EventBus;
use chunkvault_domain::value_objects::{CorrelationId, FileId};
use tracing::info;

use crate::application::services::FileService;

/// Use case for deleting a file from the vault.
///
/// ## Behavior
///
/// **Interactive mode** (`force = false`): looks up the file, prints its
/// details, asks for y/yes confirmation, deletes only if confirmed.
///
/// **Force mode** (`force = true`): deletes immediately.
///
/// `reason` is logged alongside the deletion but does not change behavior —
/// the vault has no audit log of its own beyond the structured trace.
pub struct DeleteFileUseCase<B: EventBus> {
    file_service: Arc<FileService<B>>,
}

impl<B: EventBus> DeleteFileUseCase<B> {
    pub fn new(file_service: Arc<FileService<B>>) -> Self {
        Self { file_service }
    }

    pub async fn execute(&self, file_id: &str, force: bool, reason: Option<String>) -> Result<bool> {
        let correlation_id = CorrelationId::new();
        let id = FileId::from_string(file_id);

        let record = self.file_service.get(&id, correlation_id).await?;

        println!("\n=== File to Delete ===");
        println!("Name: {}", record.display_name);
        println!("ID: {}", record.id.as_str());
        println!("Chunks: {}", record.chunk_count);
        println!("Size: {} bytes", record.original_length);
        if let Some(reason) = &reason {
            println!("Reason: {}", reason);
        }

        if !force {
            print!("\nAre you sure you want to delete '{}'? [y/N]: ", record.display_name);
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            let input = input.trim().to_lowercase();

            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(false);
            }
        }

        let deleted = self.file_service.delete(&id, correlation_id).await?;

        info!(file_id = %file_id, reason = ?reason, "deleted file");
        if deleted {
            println!("Deleted '{}'", record.display_name);
        } else {
            println!("Deletion of '{}' completed with errors removing some chunks", record.display_name);
        }

        Ok(deleted)
    }
}
