// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Gzip compression service (§4.F): the only algorithm carried forward from
//! the donor's multi-algorithm compression adapter. The three-way strategy
//! mapping lives in the domain ([`CompressionLevel::strategy`]); this
//! module only owns the concrete codec.

use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::services::CompressionService;
use chunkvault_domain::value_objects::{CompressionLevel, CompressionStrategy};
use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use std::io::Read;

/// Maps the domain's three-way strategy to a `flate2` numeric level. The
/// specific numbers are the donor's own choice of representative level per
/// bucket, not a literal pass-through of the user's 1-9 setting — §4.F only
/// requires that the *bucket* be recorded via the chunk's stored size, not
/// the original integer.
fn flate2_level(strategy: CompressionStrategy) -> Compression {
    match strategy {
        CompressionStrategy::Fastest => Compression::fast(),
        CompressionStrategy::Balanced => Compression::new(6),
        CompressionStrategy::SmallestSize => Compression::best(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GzipCompressionService;

impl CompressionService for GzipCompressionService {
    fn compress(&self, bytes: &[u8], level: CompressionLevel) -> Result<Vec<u8>, ChunkVaultError> {
        let mut output = Vec::new();
        let mut encoder = GzEncoder::new(bytes, flate2_level(level.strategy()));
        encoder
            .read_to_end(&mut output)
            .map_err(|e| ChunkVaultError::invariant(format!("gzip compression failed: {e}")))?;
        Ok(output)
    }

    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, ChunkVaultError> {
        let mut output = Vec::new();
        let mut decoder = GzDecoder::new(bytes);
        decoder
            .read_to_end(&mut output)
            .map_err(|e| ChunkVaultError::integrity_mismatch(format!("gzip decompression failed: {e}")))?;
        Ok(output)
    }
}
