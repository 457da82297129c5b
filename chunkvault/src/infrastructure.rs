// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Concrete adapters for every port the domain crate declares: storage
//! providers, `sqlx`-backed repositories, the in-process event bus, the
//! gzip compression codec, the TTL cache, and the chunk engine that ties
//! them all together (§4). Configuration, logging, and metrics live here
//! too, as the ambient plumbing every other module depends on.

pub mod cache;
pub mod chunk_engine;
pub mod compression;
pub mod config;
pub mod event_bus;
pub mod logging;
pub mod mapped_file_window;
pub mod metadata_store;
pub mod metrics;
pub mod providers;
pub mod repositories;

pub use cache::TtlCache;
pub use chunk_engine::{ChunkEngine, ChunkEngineConfig};
pub use compression::GzipCompressionService;
pub use config::{ChunkVaultConfig, LogsConfig};
pub use event_bus::{HandlerRegistry, InProcessEventBus};
pub use mapped_file_window::MappedFileWindow;
pub use metrics::ChunkVaultMetrics;
