//! # Repository Ports
//!
//! Narrow, per-entity interfaces the application layer depends on instead
//! of one generic repository (Design Notes §9: "prefer a narrow per-entity
//! interface over a single generic one"). Concrete implementations live in
//! the `chunkvault` crate's `infrastructure` module.
//!
//! - [`StorageProvider`] — byte-level chunk put/get/exists/delete (spec §4.A).
//! - [`FileRepository`], [`ChunkRepository`], [`LogRepository`] — the
//!   metadata store's document collections (spec §4.B).
//! - [`Cache`] — TTL cache with single-flighted writes (spec §4.C).
//! - [`EventBus`] — typed publish/subscribe (spec §4.D).

pub mod cache;
pub mod event_bus;
pub mod metadata_store;
pub mod storage_provider;

pub use cache::Cache;
pub use event_bus::{EventBus, EventHandler};
pub use metadata_store::{ChunkRepository, FileFilter, FileRepository, LogRecord, LogRepository};
pub use storage_provider::StorageProvider;
