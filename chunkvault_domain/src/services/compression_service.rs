//! Compression service — level mapping and the compress/decompress
//! contract.
//!
//! Only the three-way strategy mapping ([`CompressionLevel::strategy`])
//! lives in the domain; the concrete gzip codec is a specific technology
//! choice and belongs to the `chunkvault` crate's infrastructure layer
//! (`flate2` is not a domain dependency — see the workspace Cargo.toml).
//! This trait is the seam the engine depends on; infrastructure provides
//! the `flate2`-backed implementation.

use crate::error::ChunkVaultError;
use crate::value_objects::CompressionLevel;

/// Domain service interface for chunk compression and decompression.
///
/// Implementations MUST be deterministic with respect to decompression:
/// `decompress(compress(bytes, level)) == bytes` for every `level`. The
/// `level` only affects the compressed size/speed tradeoff, never
/// correctness.
pub trait CompressionService: Send + Sync {
    fn compress(&self, bytes: &[u8], level: CompressionLevel) -> Result<Vec<u8>, ChunkVaultError>;

    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, ChunkVaultError>;
}

/// No-op stand-in used where a `CompressionService` is required but
/// compression is disabled by configuration (§6 `CompressionEnabled`).
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughCompressionService;

impl CompressionService for PassthroughCompressionService {
    fn compress(&self, bytes: &[u8], _level: CompressionLevel) -> Result<Vec<u8>, ChunkVaultError> {
        Ok(bytes.to_vec())
    }

    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, ChunkVaultError> {
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_round_trips_unchanged() {
        let service = PassthroughCompressionService;
        let bytes = b"hello world".to_vec();
        let compressed = service.compress(&bytes, CompressionLevel::default()).unwrap();
        assert_eq!(compressed, bytes);
        let decompressed = service.decompress(&compressed).unwrap();
        assert_eq!(decompressed, bytes);
    }
}
