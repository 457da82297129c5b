//! # Domain Services
//!
//! Synchronous, CPU-bound services the engine composes with its
//! suspending I/O calls. These follow the same sync-domain/async-adapter
//! split as the repository ports: hashing and compression-level mapping
//! don't benefit from async I/O, so the domain trait stays synchronous and
//! the `chunkvault` crate's infrastructure layer wraps it for use inside
//! an async worker task.

pub mod checksum_service;
pub mod compression_service;

pub use checksum_service::{ChecksumService, Sha256ChecksumService, StreamingChecksum};
pub use compression_service::{CompressionService, PassthroughCompressionService};
