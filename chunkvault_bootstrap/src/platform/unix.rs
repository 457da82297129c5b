// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Unix Platform Implementation
//!
//! POSIX implementation backing [`super::Platform`] for Linux and macOS.
//! Uses `libc` for page size, CPU count, and privilege checks; memory
//! figures come from `/proc/meminfo` on Linux with a `sysconf`-based
//! fallback elsewhere.

use super::{Platform, PlatformError};
use async_trait::async_trait;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }

    fn meminfo_kb(key: &str) -> Option<u64> {
        let contents = std::fs::read_to_string("/proc/meminfo").ok()?;
        contents.lines().find_map(|line| {
            let mut parts = line.split_whitespace();
            if parts.next()? == key {
                parts.next()?.parse::<u64>().ok()
            } else {
                None
            }
        })
    }

    fn memory_via_sysconf() -> Result<(u64, u64), PlatformError> {
        // SAFETY: `sysconf` is a simple read of a kernel-provided constant;
        // the arguments are the standard `_SC_*` names for page size and
        // page counts, valid on every POSIX target.
        unsafe {
            let page_size = libc::sysconf(libc::_SC_PAGESIZE);
            let total_pages = libc::sysconf(libc::_SC_PHYS_PAGES);
            let avail_pages = libc::sysconf(libc::_SC_AVPHYS_PAGES);
            if page_size <= 0 || total_pages <= 0 {
                return Err(PlatformError::Other("sysconf returned invalid value".to_string()));
            }
            let page_size = page_size as u64;
            let total = total_pages as u64 * page_size;
            let avail = avail_pages.max(0) as u64 * page_size;
            Ok((total, avail))
        }
    }
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for UnixPlatform {
    fn page_size(&self) -> usize {
        // SAFETY: `_SC_PAGESIZE` is always a valid sysconf name on POSIX.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    }

    fn cpu_count(&self) -> usize {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        if let Some(kb) = Self::meminfo_kb("MemTotal:") {
            return Ok(kb * 1024);
        }
        Self::memory_via_sysconf().map(|(total, _)| total)
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        if let Some(kb) = Self::meminfo_kb("MemAvailable:") {
            return Ok(kb * 1024);
        }
        Self::memory_via_sysconf().map(|(_, avail)| avail)
    }

    fn line_separator(&self) -> &'static str {
        "\n"
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn platform_name(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macos"
        } else {
            "linux"
        }
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn is_elevated(&self) -> bool {
        // SAFETY: `geteuid` takes no arguments and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<(), PlatformError> {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => meta.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    async fn sync_file(&self, file: &tokio::fs::File) -> Result<(), PlatformError> {
        file.sync_all().await?;
        Ok(())
    }
}
