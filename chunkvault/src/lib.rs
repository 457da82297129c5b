// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # ChunkVault
//!
//! A content-addressed chunk storage system: files are split into
//! adaptively-sized, checksummed, optionally-compressed chunks and
//! distributed round-robin across one or more storage providers, then
//! reassembled on demand.
//!
//! ## Architecture Overview
//!
//! The crate follows Clean Architecture and Domain-Driven Design
//! principles, with the pure domain logic (`chunkvault_domain`) kept
//! separate from this crate's infrastructure and application layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Presentation Layer                       │
//! │  (composition root: config → providers → services)          │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                          │
//! │  (Use Cases, FileService, DirectoryIndexer)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (chunkvault_domain)          │
//! │  (Entities, Value Objects, Domain Services, Events)          │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                         │
//! │  (Storage providers, SQLite repositories, cache, metrics)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Concepts
//!
//! ### Files and Chunks
//! A file is split into an adaptively-sized run of chunks (spec §4.D's
//! chunk size policy picks a bucket from the file's total size). Each
//! chunk carries its own checksum and is optionally gzip-compressed
//! before being handed to a [`StorageProvider`](chunkvault_domain::repositories::StorageProvider).
//!
//! ### Storage Providers
//! Chunks are placed round-robin across whichever providers are
//! configured: local filesystem, a GridFS-style SQLite blob table, or
//! S3. Providers are pluggable behind one trait, so adding a backend
//! never touches [`ChunkEngine`](infrastructure::ChunkEngine).
//!
//! ### Directory Indexing
//! [`DirectoryIndexer`](application::DirectoryIndexer) walks a directory
//! tree independently of the chunking pipeline, recording `File`/
//! `Directory` entries, optionally hashing content and tagging
//! duplicates.
//!
//! ## Error Handling
//!
//! All fallible domain and infrastructure operations return
//! `Result<_, chunkvault_domain::error::ChunkVaultError>`; the
//! application and presentation layers translate these into
//! `anyhow::Result` at the use-case boundary.
//!
//! ## Observability
//!
//! Structured logging is built on `tracing`, correlated per request via
//! [`infrastructure::logging::begin_scope`]. Prometheus metrics are
//! exposed through [`infrastructure::ChunkVaultMetrics`].
//!
//! ## Testing
//!
//! ```bash
//! cargo test
//! ```

pub mod application;
pub mod infrastructure;
pub mod presentation;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

pub use chunkvault_domain::entities::{ChunkRecord, FileRecord};
pub use chunkvault_domain::error::ChunkVaultError;
pub use chunkvault_domain::value_objects::{ChunkId, ChunkSize, CorrelationId, FileId};

pub use crate::application::{DirectoryIndexer, FileService};
pub use crate::infrastructure::{ChunkEngine, ChunkVaultConfig};
