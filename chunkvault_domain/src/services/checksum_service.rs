//! Checksum service — SHA-256 over whole files and individual chunk ranges.
//!
//! Domain traits are synchronous: hashing is CPU-bound and doesn't benefit
//! from async I/O. The `chunkvault` crate's infrastructure layer wraps
//! this with an async adapter that runs the work on a blocking thread so
//! it cooperates with the rest of the pipeline's suspension points (§5).

use crate::value_objects::{Checksum, StreamingHasher};
use rayon::prelude::*;

/// Domain service interface for computing and verifying SHA-256 checksums.
pub trait ChecksumService: Send + Sync {
    /// Hashes a single in-memory buffer.
    fn checksum_bytes(&self, bytes: &[u8]) -> Checksum;

    /// Hashes several independent buffers (e.g. chunk ranges) in parallel.
    /// Order of the returned vector matches the order of `buffers`.
    fn checksum_many(&self, buffers: &[&[u8]]) -> Vec<Checksum>;

    /// Whether `bytes` hashes to `expected` (case-insensitive hex compare).
    fn verify(&self, bytes: &[u8], expected: &Checksum) -> bool;
}

/// SHA-256 implementation. Multi-buffer hashing fans out over `rayon`'s
/// global thread pool — appropriate here because each buffer is hashed
/// independently with no shared mutable state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256ChecksumService;

impl ChecksumService for Sha256ChecksumService {
    fn checksum_bytes(&self, bytes: &[u8]) -> Checksum {
        Checksum::of(bytes)
    }

    fn checksum_many(&self, buffers: &[&[u8]]) -> Vec<Checksum> {
        buffers.par_iter().map(|buf| Checksum::of(buf)).collect()
    }

    fn verify(&self, bytes: &[u8], expected: &Checksum) -> bool {
        self.checksum_bytes(bytes).as_hex() == expected.as_hex()
    }
}

/// Streaming facade over [`StreamingHasher`] for the whole-file pass that
/// precedes chunking (§4.F step 2): callers feed successive reads from the
/// source without holding the entire file in memory.
#[derive(Default)]
pub struct StreamingChecksum(StreamingHasher);

impl StreamingChecksum {
    pub fn new() -> Self {
        Self(StreamingHasher::new())
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    pub fn finish(self) -> Checksum {
        self.0.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_bytes_matches_known_value() {
        let service = Sha256ChecksumService;
        assert_eq!(
            service.checksum_bytes(b"hello\n").as_hex(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn checksum_many_preserves_order() {
        let service = Sha256ChecksumService;
        let buffers: Vec<&[u8]> = vec![b"a", b"b", b"c"];
        let sums = service.checksum_many(&buffers);
        assert_eq!(sums[0], Checksum::of(b"a"));
        assert_eq!(sums[1], Checksum::of(b"b"));
        assert_eq!(sums[2], Checksum::of(b"c"));
    }

    #[test]
    fn verify_detects_single_byte_flip() {
        let service = Sha256ChecksumService;
        let original = b"hello\n".to_vec();
        let sum = service.checksum_bytes(&original);
        assert!(service.verify(&original, &sum));
        let mut corrupted = original.clone();
        corrupted[0] ^= 0x01;
        assert!(!service.verify(&corrupted, &sum));
    }

    #[test]
    fn streaming_matches_one_shot_over_same_bytes() {
        let mut streaming = StreamingChecksum::new();
        streaming.update(b"hel");
        streaming.update(b"lo\n");
        assert_eq!(streaming.finish(), Checksum::of(b"hello\n"));
    }
}
