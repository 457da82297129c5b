//! Cache port (spec §4.C).

use crate::error::ChunkVaultError;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the deserialized value, or `None` on a miss or a
    /// deserialization failure — serialization errors must never propagate
    /// as an error from `get` (§4.C).
    async fn get(&self, key: &str) -> Option<String>;

    /// Single-flighted per key: concurrent `set` calls for the same key are
    /// serialized through a per-key lock created lazily.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), ChunkVaultError>;

    /// May be coalesced with other deletes of the same operation type; see
    /// the cache's batching documentation for the flush policy.
    async fn delete(&self, key: &str) -> Result<(), ChunkVaultError>;

    /// Extends an existing key's TTL. Returns `false` without creating the
    /// key if it is missing.
    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<bool, ChunkVaultError>;
}
