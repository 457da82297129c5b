// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Random-access byte-range reader over a large input (§4.E), built on
//! `memmap2` for already-seekable files and `tempfile` to materialize a
//! temp file when the source isn't (e.g. stdin). `read` is safe for
//! concurrent callers across disjoint ranges: the `Mmap` is immutable and
//! shared behind an `Arc`.

use chunkvault_domain::error::ChunkVaultError;
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub struct MappedFileWindow {
    mmap: Arc<Mmap>,
    // Kept alive only to delete on drop; `None` when the window was opened
    // directly over a caller-owned file.
    temp_path: Option<PathBuf>,
}

impl MappedFileWindow {
    /// Opens a window directly over an existing file, assumed seekable.
    pub fn open(path: &std::path::Path) -> Result<Self, ChunkVaultError> {
        let file = File::open(path)?;
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| ChunkVaultError::transient_io(format!("mmap failed: {e}")))?
        };
        Ok(Self {
            mmap: Arc::new(mmap),
            temp_path: None,
        })
    }

    /// Materializes a temp file by draining `source`, then maps it.
    /// Used for non-seekable inputs (stdin, network streams).
    pub fn materialize(mut source: impl Read) -> Result<Self, ChunkVaultError> {
        let mut temp = NamedTempFile::new().map_err(|e| {
            ChunkVaultError::transient_io(format!("failed to create temp file: {e}"))
        })?;
        std::io::copy(&mut source, &mut temp)
            .map_err(|e| ChunkVaultError::transient_io(format!("failed to materialize source: {e}")))?;
        temp.flush()?;

        let path = temp.path().to_path_buf();
        let file = temp.reopen().map_err(|e| {
            ChunkVaultError::transient_io(format!("failed to reopen temp file: {e}"))
        })?;
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| ChunkVaultError::transient_io(format!("mmap failed: {e}")))?
        };

        // `temp` (the NamedTempFile guard) would delete the file on drop at
        // the end of this function; persist it under our own path so the
        // window's own Drop controls its lifetime instead.
        let persisted_path = temp.into_temp_path();
        persisted_path.keep().map_err(|e| {
            ChunkVaultError::transient_io(format!("failed to persist temp file: {e}"))
        })?;

        Ok(Self {
            mmap: Arc::new(mmap),
            temp_path: Some(path),
        })
    }

    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Reads `[offset, offset+length)`. Safe across concurrent callers on
    /// disjoint ranges since the backing `Mmap` is read-only and shared.
    pub fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>, ChunkVaultError> {
        let start = offset as usize;
        let end = start
            .checked_add(length as usize)
            .ok_or_else(|| ChunkVaultError::invariant("byte range overflows usize"))?;
        self.mmap
            .get(start..end)
            .map(|slice| slice.to_vec())
            .ok_or_else(|| {
                ChunkVaultError::invariant(format!(
                    "range [{start}, {end}) out of bounds for a {}-byte window",
                    self.mmap.len()
                ))
            })
    }
}

impl Drop for MappedFileWindow {
    fn drop(&mut self) {
        if let Some(path) = self.temp_path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
