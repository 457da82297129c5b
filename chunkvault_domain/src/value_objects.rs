//! # Value Objects
//!
//! Immutable, self-validating types with no identity of their own —
//! equality is by value. Each module owns a single concept from the data
//! model in spec §3.

pub mod cancellation;
pub mod checksum;
pub mod chunk_id;
pub mod chunk_size;
pub mod compression_level;
pub mod correlation_id;
pub mod file_id;
pub mod lifecycle_status;

pub use cancellation::CancellationToken;
pub use checksum::{Checksum, StreamingHasher};
pub use chunk_id::ChunkId;
pub use chunk_size::{optimal_for_file_size, ChunkSize, ChunkSizeConfig};
pub use compression_level::{CompressionLevel, CompressionStrategy};
pub use correlation_id::CorrelationId;
pub use file_id::FileId;
pub use lifecycle_status::LifecycleStatus;
