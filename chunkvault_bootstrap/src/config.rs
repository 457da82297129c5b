// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Configuration Discovery
//!
//! Locates the configuration file the CLI should load, before the
//! `chunkvault` crate's `infrastructure::config` module takes over parsing
//! it. This module only answers "which file", never "what's in it" — that
//! split keeps the bootstrap layer free of the layered-config/env-override
//! machinery that belongs one layer in.

use std::path::{Path, PathBuf};

/// Search order when no `--config` flag is given: `./chunkvault.toml`,
/// then `$XDG_CONFIG_HOME/chunkvault/config.toml` (falling back to
/// `~/.config/chunkvault/config.toml` if `XDG_CONFIG_HOME` is unset).
pub fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let cwd_candidate = PathBuf::from("chunkvault.toml");
    if cwd_candidate.is_file() {
        return Some(cwd_candidate);
    }

    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs_home().map(|home| home.join(".config")));

    config_home.map(|dir| dir.join("chunkvault").join("config.toml")).filter(|path| path.is_file())
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_discovery() {
        let explicit = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(discover_config_path(Some(&explicit)), Some(explicit));
    }

    #[test]
    fn missing_files_resolve_to_none() {
        // No chunkvault.toml in the test working directory, and no real
        // config under a throwaway XDG_CONFIG_HOME.
        std::env::set_var("XDG_CONFIG_HOME", "/nonexistent-chunkvault-test-dir");
        assert_eq!(discover_config_path(None), None);
        std::env::remove_var("XDG_CONFIG_HOME");
    }
}
