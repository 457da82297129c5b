//! Compression level and strategy mapping (spec §4.F).

use serde::{Deserialize, Serialize};

/// A user-facing numeric compression level, 1–9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionLevel(u8);

/// The three-way strategy every numeric level collapses to before being
/// handed to the gzip encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionStrategy {
    Fastest,
    Balanced,
    SmallestSize,
}

impl CompressionLevel {
    pub fn new(level: u8) -> Self {
        Self(level.clamp(1, 9))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// `≤3 → Fastest`, `≥8 → SmallestSize`, otherwise `Balanced`.
    pub fn strategy(&self) -> CompressionStrategy {
        match self.0 {
            0..=3 => CompressionStrategy::Fastest,
            8..=9 => CompressionStrategy::SmallestSize,
            _ => CompressionStrategy::Balanced,
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::new(6)
    }
}
