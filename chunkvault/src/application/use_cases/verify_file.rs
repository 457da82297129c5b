// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Use case for the CLI `verify` command.

use std::sync::Arc;

use anyhow::Result;
use chunkvault_domain::repositories::EventBus;
use chunkvault_domain::value_objects::{CancellationToken, CorrelationId, FileId};
use tracing::{info, warn};

use crate::application::services::FileService;

/// Verifies a file's integrity, shallow or deep (spec §4.F `mergeAndVerify`).
///
/// A shallow verify only checks the stored record's lifecycle status. A
/// deep verify reassembles the whole file into memory and re-hashes it,
/// comparing against the recorded checksum.
///
/// `repair` is accepted for CLI compatibility but never acts on a mismatch —
/// the vault reports, it does not auto-repair (spec §9 Design Notes).
pub struct VerifyFileUseCase<B: EventBus> {
    file_service: Arc<FileService<B>>,
}

impl<B: EventBus> VerifyFileUseCase<B> {
    pub fn new(file_service: Arc<FileService<B>>) -> Self {
        Self { file_service }
    }

    pub async fn execute(&self, file_id: &str, deep: bool, repair: bool, cancellation: &CancellationToken) -> Result<bool> {
        if repair {
            warn!(file_id = %file_id, "repair was requested but chunkvault never auto-repairs a failed verification");
        }

        let correlation_id = CorrelationId::new();
        let id = FileId::from_string(file_id);
        let ok = self.file_service.verify(&id, deep, correlation_id, cancellation).await?;

        info!(file_id = %file_id, deep, ok, "verified file");
        if ok {
            println!("{} verified OK ({})", file_id, if deep { "deep" } else { "shallow" });
        } else {
            println!("{} FAILED verification ({})", file_id, if deep { "deep" } else { "shallow" });
        }

        Ok(ok)
    }
}
