//! Adaptive chunk size value object and sizing policy (spec §4.F).
//!
//! `ChunkSize` itself is a thin validated wrapper; `optimal_for_file_size`
//! is the pure function the engine calls to turn a file length into a
//! target chunk length. The policy's constants are configurable (see
//! [`ChunkSizeConfig`]) but the function itself is pure: same input, same
//! config, same output.

use crate::error::ChunkVaultError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkSize(u64);

impl ChunkSize {
    pub fn new(bytes: u64) -> Result<Self, ChunkVaultError> {
        if bytes == 0 {
            return Err(ChunkVaultError::invariant("chunk size must be non-zero"));
        }
        Ok(Self(bytes))
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }

    /// How many chunks a file of `file_size` bytes splits into at this
    /// chunk size.
    pub fn chunks_needed_for_file(&self, file_size: u64) -> u32 {
        if file_size == 0 {
            return 0;
        }
        file_size.div_ceil(self.0) as u32
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= MIB {
            write!(f, "{:.2} MiB", self.0 as f64 / MIB as f64)
        } else if self.0 >= KIB {
            write!(f, "{:.2} KiB", self.0 as f64 / KIB as f64)
        } else {
            write!(f, "{} B", self.0)
        }
    }
}

/// The configurable constants behind the adaptive sizing table (§6's
/// `MinChunkSizeInBytes` / `MaxChunkSizeInBytes` / `DefaultChunkSizeInBytes`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSizeConfig {
    pub min: u64,
    pub max: u64,
    pub default: u64,
}

impl Default for ChunkSizeConfig {
    fn default() -> Self {
        Self {
            min: 32 * KIB,
            max: 4 * MIB,
            default: MIB,
        }
    }
}

/// Computes the target chunk size for a file of `file_size` bytes per the
/// fixed policy table in spec §4.F.
pub fn optimal_for_file_size(file_size: u64, config: ChunkSizeConfig) -> ChunkSize {
    let ChunkSizeConfig { min, max, default } = config;

    let target = if file_size == 0 {
        default
    } else if file_size <= min {
        min
    } else if file_size < MIB {
        min.max(file_size)
    } else if file_size < 10 * MIB {
        min.max(MIB.min(default))
    } else if file_size < 100 * MIB {
        (2 * MIB).max(default.min(file_size / 10))
    } else if file_size < GIB {
        (5 * MIB).min(max)
    } else if file_size < 10 * GIB {
        (10 * MIB).min(max)
    } else {
        max
    };

    // Defensive clamp: the table above can only undershoot `min` when
    // `file_size` itself is smaller than `min`, which the `file_size <= min`
    // branch already special-cases, so this never changes the table's
    // output in practice — it only guards against a misconfigured `min`/`max`.
    ChunkSize::new(target.clamp(min, max.max(min))).unwrap_or(ChunkSize(min.max(1)))
}


// Property-based checks for spec §8 properties 3 ("optimal size
// monotonicity") and the "within [min, max] except fileSize < min" carve-out,
// run across the full `u64` domain rather than a handful of hand-picked
// sizes.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn always_within_min_max_or_equal_to_file_size_below_min(file_size in any::<u64>()) {
            let cfg = ChunkSizeConfig::default();
            let result = optimal_for_file_size(file_size, cfg).bytes();
            if file_size > 0 && file_size <= cfg.min {
                prop_assert_eq!(result, cfg.min);
            } else {
                prop_assert!(result >= cfg.min);
                prop_assert!(result <= cfg.max);
            }
        }

        #[test]
        fn pure_function_same_input_same_output(file_size in any::<u64>()) {
            let cfg = ChunkSizeConfig::default();
            let first = optimal_for_file_size(file_size, cfg).bytes();
            let second = optimal_for_file_size(file_size, cfg).bytes();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn non_decreasing_as_file_size_grows(a in any::<u64>(), b in any::<u64>()) {
            let cfg = ChunkSizeConfig::default();
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            let small_result = optimal_for_file_size(small, cfg).bytes();
            let large_result = optimal_for_file_size(large, cfg).bytes();
            prop_assert!(large_result >= small_result);
        }
    }
}
