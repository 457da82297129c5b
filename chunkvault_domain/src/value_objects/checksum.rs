//! SHA-256 checksum value object.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 digest, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    pub const ALGORITHM: &'static str = "SHA256";

    /// Computes the checksum of a single in-memory buffer.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps an already-computed hex digest (e.g. from a streaming hasher).
    /// Normalizes to lowercase since comparisons are case-insensitive hex
    /// per §4.F's merge-and-verify contract.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_lowercase())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incremental SHA-256 hasher used for streaming passes over a file or a
/// chunk range without materializing the whole buffer.
#[derive(Default)]
pub struct StreamingHasher {
    inner: Sha256,
}

impl StreamingHasher {
    pub fn new() -> Self {
        Self { inner: Sha256::new() }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    pub fn finalize(self) -> Checksum {
        Checksum::from_hex(hex::encode(self.inner.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_checksum_matches_known_value() {
        let sum = Checksum::of(b"hello\n");
        assert_eq!(
            sum.as_hex(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn from_hex_lowercases() {
        let sum = Checksum::from_hex("ABCDEF");
        assert_eq!(sum.as_hex(), "abcdef");
    }

    #[test]
    fn streaming_hasher_matches_one_shot() {
        let mut streaming = StreamingHasher::new();
        streaming.update(b"hel");
        streaming.update(b"lo\n");
        assert_eq!(streaming.finalize(), Checksum::of(b"hello\n"));
    }
}
