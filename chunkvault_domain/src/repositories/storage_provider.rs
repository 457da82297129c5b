//! StorageProvider port (spec §4.A).

use crate::error::ChunkVaultError;
use crate::value_objects::{ChunkId, CorrelationId};
use async_trait::async_trait;

/// Byte-level chunk put/get/exists/delete contract over one backend.
///
/// Contractual guarantees the implementor must uphold:
/// - `put` is atomic with respect to crash: the returned storage path MUST
///   NOT be observable by `get`/`exists` unless the full payload is durable.
/// - `get` returns bytes byte-identical to those supplied to `put`.
/// - `delete` is idempotent: deleting a non-existent chunk returns `false`,
///   not an error.
/// - `exists` never errors for a well-formed id.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Unique, lowercase provider identifier.
    fn provider_id(&self) -> &str;

    /// Human-readable provider type, e.g. `"filesystem"`, `"gridfs"`, `"s3"`.
    fn provider_type(&self) -> &str;

    async fn put(&self, chunk_id: &ChunkId, bytes: &[u8], correlation_id: CorrelationId) -> Result<String, ChunkVaultError>;

    async fn get(&self, chunk_id: &ChunkId, storage_path: &str, correlation_id: CorrelationId) -> Result<Vec<u8>, ChunkVaultError>;

    async fn exists(&self, chunk_id: &ChunkId, storage_path: &str, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError>;

    /// Idempotent: returns `Ok(false)` rather than an error when the chunk
    /// is already absent.
    async fn delete(&self, chunk_id: &ChunkId, storage_path: &str, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError>;

    /// Releases any resources held by the provider (connection pools,
    /// file handles). A no-op for stateless providers.
    async fn close(&self) -> Result<(), ChunkVaultError> {
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for std::sync::Arc<dyn StorageProvider> {
    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }

    fn provider_type(&self) -> &str {
        (**self).provider_type()
    }

    async fn put(&self, chunk_id: &ChunkId, bytes: &[u8], correlation_id: CorrelationId) -> Result<String, ChunkVaultError> {
        (**self).put(chunk_id, bytes, correlation_id).await
    }

    async fn get(&self, chunk_id: &ChunkId, storage_path: &str, correlation_id: CorrelationId) -> Result<Vec<u8>, ChunkVaultError> {
        (**self).get(chunk_id, storage_path, correlation_id).await
    }

    async fn exists(&self, chunk_id: &ChunkId, storage_path: &str, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        (**self).exists(chunk_id, storage_path, correlation_id).await
    }

    async fn delete(&self, chunk_id: &ChunkId, storage_path: &str, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        (**self).delete(chunk_id, storage_path, correlation_id).await
    }

    async fn close(&self) -> Result<(), ChunkVaultError> {
        (**self).close().await
    }
}
