// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Use Cases
//!
//! One use case per CLI command (spec §6's external CLI surface), each a
//! thin wrapper that translates `chunkvault_bootstrap::ValidatedCommand`
//! arguments into calls on `FileService`/`DirectoryIndexer`/`ChunkVaultMetrics`
//! and formats the result for the terminal.

pub mod delete_file;
pub mod download_file;
pub mod list_files;
pub mod seek_directory;
pub mod seek_directory_plus;
pub mod show_metrics;
pub mod upload_file;
pub mod verify_file;

pub use delete_file::DeleteFileUseCase;
pub use download_file::DownloadFileUseCase;
pub use list_files::ListFilesUseCase;
pub use seek_directory::SeekDirectoryUseCase;
pub use seek_directory_plus::SeekDirectoryPlusUseCase;
pub use show_metrics::ShowMetricsUseCase;
pub use upload_file::UploadFileUseCase;
pub use verify_file::VerifyFileUseCase;
