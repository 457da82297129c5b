//! Chunk id value object.
//!
//! Stable identity: `<fileId>_<sequenceNumber>`.

use crate::value_objects::FileId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn new(file_id: &FileId, sequence_number: u32) -> Self {
        Self(format!("{}_{}", file_id.as_str(), sequence_number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-character hashed prefix used by providers to bound fan-out
    /// per directory/bucket (§6 persisted layouts). Falls back to the first
    /// two hex characters of the MD5 hash for ids shorter than two chars.
    pub fn hashed_prefix(&self) -> String {
        if self.0.len() >= 2 {
            self.0[..2].to_string()
        } else {
            use md5::{Digest, Md5};
            let digest = Md5::digest(self.0.as_bytes());
            hex::encode(&digest[..1])
        }
    }

    /// Sanitizes the id for use as a remote-object-storage key: `/` and `\`
    /// are replaced with `_`.
    pub fn sanitized(&self) -> String {
        self.0.replace(['/', '\\'], "_")
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChunkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
