// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first argument validation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parse_cli()                     │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! The command surface follows the external CLI contract: `upload`,
//! `download`, `list`, `delete`, `verify`, `seek`, `seek-plus`, `metrics`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "chunkvault", version, about = "Content-addressed chunk pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a configuration file (TOML). Overrides layered config
    /// discovery (see the `chunkvault` crate's `infrastructure::config`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Maximum in-flight chunk tasks per split/merge (overrides config's
    /// `MaxParallelTasks`).
    #[arg(long, global = true)]
    pub max_parallel_tasks: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Split a file into chunks and distribute them across backends.
    Upload { file_path: PathBuf },

    /// Reassemble a file from its stored chunks.
    Download {
        file_id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List known files, optionally filtered.
    List {
        #[arg(long)]
        parent_id: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },

    /// Delete a file and its chunks.
    Delete {
        file_id: String,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Verify a file's integrity by re-hashing its reassembled bytes.
    Verify {
        file_id: String,
        #[arg(long)]
        deep: bool,
        #[arg(long)]
        repair: bool,
    },

    /// Walk a directory and record per-entry metadata.
    Seek {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        recursive: bool,
    },

    /// Walk a directory, optionally hashing file content and flagging
    /// duplicates.
    SeekPlus {
        path: PathBuf,
        #[arg(long)]
        process_content: bool,
        #[arg(long)]
        parallel: bool,
        #[arg(long)]
        check_duplicates: bool,
    },

    /// Report operational metrics.
    Metrics {
        #[arg(long, default_value = "all")]
        metric_type: String,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Validated CLI configuration: every path has been checked for traversal
/// attempts and every numeric argument range-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub max_parallel_tasks: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Upload { file_path: PathBuf },
    Download { file_id: String, output: Option<PathBuf> },
    List { parent_id: Option<String>, content_type: Option<String>, tag: Option<String> },
    Delete { file_id: String, force: bool, reason: Option<String> },
    Verify { file_id: String, deep: bool, repair: bool },
    Seek { path: PathBuf, recursive: bool },
    SeekPlus { path: PathBuf, process_content: bool, parallel: bool, check_duplicates: bool },
    Metrics { metric_type: String },
}

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },

    #[error("path traversal or unsafe pattern rejected in {arg}: {value}")]
    UnsafePath { arg: String, value: String },
}

/// Security validation for CLI string/path arguments: rejects shell
/// metacharacters, null bytes, and `..` path-traversal segments before any
/// value reaches the filesystem or a storage backend.
pub struct SecureArgParser;

impl SecureArgParser {
    const DANGEROUS_PATTERNS: &'static [&'static str] = &["../", "..\\", "\0", "|", ";", "&&", "$(", "`"];

    /// Validates a free-form string argument (names, tags, ids) against
    /// injection-style patterns. Does not touch the filesystem.
    pub fn validate_argument(value: &str) -> Result<(), ParseError> {
        for pattern in Self::DANGEROUS_PATTERNS {
            if value.contains(pattern) {
                return Err(ParseError::UnsafePath {
                    arg: "argument".to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validates a path argument and returns it unchanged on success.
    /// Rejects traversal patterns; does not require the path to exist
    /// (existence is the caller's concern, e.g. `upload` checks readability
    /// itself when it opens the file).
    pub fn validate_path(value: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(value)?;
        Ok(PathBuf::from(value))
    }
}

/// Parses CLI arguments and applies security validation, returning a
/// [`ValidatedCli`] ready for the application layer.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate_cli(parse_cli())
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    if let Some(threads) = cli.max_parallel_tasks {
        if threads == 0 || threads > 256 {
            return Err(ParseError::InvalidValue {
                arg: "max-parallel-tasks".to_string(),
                reason: "must be between 1 and 256".to_string(),
            });
        }
    }

    let command = match cli.command {
        Commands::Upload { file_path } => ValidatedCommand::Upload {
            file_path: SecureArgParser::validate_path(&file_path.to_string_lossy())?,
        },
        Commands::Download { file_id, output } => {
            SecureArgParser::validate_argument(&file_id)?;
            if let Some(ref path) = output {
                SecureArgParser::validate_argument(&path.to_string_lossy())?;
            }
            ValidatedCommand::Download { file_id, output }
        }
        Commands::List { parent_id, content_type, tag } => {
            if let Some(ref v) = parent_id {
                SecureArgParser::validate_argument(v)?;
            }
            ValidatedCommand::List { parent_id, content_type, tag }
        }
        Commands::Delete { file_id, force, reason } => {
            SecureArgParser::validate_argument(&file_id)?;
            ValidatedCommand::Delete { file_id, force, reason }
        }
        Commands::Verify { file_id, deep, repair } => {
            SecureArgParser::validate_argument(&file_id)?;
            ValidatedCommand::Verify { file_id, deep, repair }
        }
        Commands::Seek { path, recursive } => ValidatedCommand::Seek {
            path: SecureArgParser::validate_path(&path.to_string_lossy())?,
            recursive,
        },
        Commands::SeekPlus { path, process_content, parallel, check_duplicates } => ValidatedCommand::SeekPlus {
            path: SecureArgParser::validate_path(&path.to_string_lossy())?,
            process_content,
            parallel,
            check_duplicates,
        },
        Commands::Metrics { metric_type } => {
            if !matches!(metric_type.as_str(), "memory" | "cpu" | "disk" | "all") {
                return Err(ParseError::InvalidValue {
                    arg: "metric-type".to_string(),
                    reason: "must be one of memory, cpu, disk, all".to_string(),
                });
            }
            ValidatedCommand::Metrics { metric_type }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config: cli.config,
        max_parallel_tasks: cli.max_parallel_tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_argument_rejects_traversal() {
        assert!(SecureArgParser::validate_argument("../../etc/passwd").is_err());
    }

    #[test]
    fn validate_argument_accepts_plain_id() {
        assert!(SecureArgParser::validate_argument("01HXYZ123").is_ok());
    }

    #[test]
    fn validate_argument_rejects_shell_metacharacters() {
        assert!(SecureArgParser::validate_argument("file.txt; rm -rf /").is_err());
    }
}
