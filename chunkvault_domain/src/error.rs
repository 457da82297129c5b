//! # Domain Error System
//!
//! A hierarchical error taxonomy for the chunkvault domain. Errors are
//! surfaced through return values at every component boundary; this enum
//! is reserved for invariant violations and the handful of failure classes
//! the pipeline actually needs to distinguish between.
//!
//! ## Error Categories
//!
//! - **NotFound** — a referenced entity (file, chunk, provider) is absent.
//! - **BackendConfig** — a storage backend is misconfigured or unreachable.
//! - **TransientIO** — a retryable I/O failure.
//! - **IntegrityMismatch** — a checksum disagreement.
//! - **Invariant** — an internal bug: sequence gaps, count mismatches.
//! - **Cancelled** — cooperative cancellation via a [`CancellationToken`](crate::value_objects::CancellationToken).

use thiserror::Error;

/// Domain-specific errors for the chunkvault system.
#[derive(Error, Debug, Clone)]
pub enum ChunkVaultError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend misconfigured: {0}")]
    BackendConfig(String),

    #[error("transient I/O failure: {0}")]
    TransientIO(String),

    #[error("integrity mismatch: {0}")]
    IntegrityMismatch(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl ChunkVaultError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn backend_config(msg: impl Into<String>) -> Self {
        Self::BackendConfig(msg.into())
    }

    pub fn transient_io(msg: impl Into<String>) -> Self {
        Self::TransientIO(msg.into())
    }

    pub fn integrity_mismatch(msg: impl Into<String>) -> Self {
        Self::IntegrityMismatch(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Whether retrying the operation unchanged has a reasonable chance of
    /// succeeding.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ChunkVaultError::TransientIO(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            ChunkVaultError::NotFound(_) => "not_found",
            ChunkVaultError::BackendConfig(_) => "backend_config",
            ChunkVaultError::TransientIO(_) => "transient_io",
            ChunkVaultError::IntegrityMismatch(_) => "integrity_mismatch",
            ChunkVaultError::Invariant(_) => "invariant",
            ChunkVaultError::Cancelled(_) => "cancelled",
        }
    }
}

impl From<std::io::Error> for ChunkVaultError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ChunkVaultError::NotFound(err.to_string()),
            std::io::ErrorKind::Interrupted | std::io::ErrorKind::TimedOut => {
                ChunkVaultError::TransientIO(err.to_string())
            }
            _ => ChunkVaultError::TransientIO(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ChunkVaultError {
    fn from(err: serde_json::Error) -> Self {
        ChunkVaultError::Invariant(format!("serialization error: {err}"))
    }
}

// NOTE: storage-format (TOML/YAML) error conversions are deliberately absent
// here; serialization format choice is an infrastructure concern. The domain
// only needs JSON for cache value (de)serialization.
