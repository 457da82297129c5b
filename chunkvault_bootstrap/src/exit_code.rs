// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Exit Codes
//!
//! The external CLI contract (spec §6) only promises two codes: `0` on
//! success, `1` on failure or not-found. This module maps richer error
//! categories to that contract while leaving room for a handful of
//! sysexits-style codes a future collaborator might want to distinguish in
//! logs, without ever returning anything but 0/1 at the process boundary.

use std::process::ExitCode as ProcessExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl From<ExitCode> for ProcessExitCode {
    fn from(code: ExitCode) -> Self {
        ProcessExitCode::from(code as u8)
    }
}

/// Maps a domain error's category (see `ChunkVaultError::category`) to an
/// exit code. Every category other than success maps to `Failure` — the
/// CLI contract doesn't distinguish further, but the mapping stays
/// centralized so a future collaborator can extend it without touching
/// call sites.
pub fn map_error_to_exit_code(_category: &str) -> ExitCode {
    ExitCode::Failure
}

/// Converts a use-case `Result` into a process exit code.
pub fn result_to_exit_code<T, E: std::fmt::Display>(result: Result<T, E>) -> ProcessExitCode {
    match result {
        Ok(_) => ExitCode::Success.into(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::Failure.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_to_zero() {
        let code: ProcessExitCode = ExitCode::Success.into();
        assert_eq!(format!("{code:?}"), format!("{:?}", ProcessExitCode::from(0u8)));
    }

    #[test]
    fn any_error_maps_to_failure() {
        assert_eq!(map_error_to_exit_code("not_found"), ExitCode::Failure);
        assert_eq!(map_error_to_exit_code("integrity_mismatch"), ExitCode::Failure);
    }

    #[test]
    fn result_to_exit_code_reports_ok_and_err() {
        let ok: Result<(), String> = Ok(());
        let err: Result<(), String> = Err("boom".to_string());
        let _ = result_to_exit_code(ok);
        let _ = result_to_exit_code(err);
    }
}
