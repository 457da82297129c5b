// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Configuration
//!
//! Layers default values, an optional TOML file, and `CHUNKVAULT_`-prefixed
//! environment variables into a single typed [`ChunkVaultConfig`] consumed
//! by every infrastructure constructor (§6). File loading and CLI wiring are
//! a collaborator concern; this module only turns a resolved path (or its
//! absence) into a validated struct.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChunkingConfig {
    pub min_chunk_size_in_bytes: u64,
    pub max_chunk_size_in_bytes: u64,
    pub default_chunk_size_in_bytes: u64,
    pub compression_enabled: bool,
    pub compression_level: u8,
    pub checksum_algorithm: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_chunk_size_in_bytes: 32 * 1024,
            max_chunk_size_in_bytes: 4 * 1024 * 1024,
            default_chunk_size_in_bytes: 1024 * 1024,
            compression_enabled: true,
            compression_level: 6,
            checksum_algorithm: "SHA256".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionConfig {
    pub max_parallel_tasks: usize,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self { max_parallel_tasks: 4 }
    }
}

/// Per-provider settings; every field is optional since not every provider
/// needs every setting, and only enabled providers are ever constructed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderSettings {
    pub filesystem_base_path: Option<String>,
    pub object_store_database_name: Option<String>,
    pub remote_bucket_name: Option<String>,
    pub remote_key_prefix: Option<String>,
    pub remote_server_side_encryption: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvidersConfig {
    /// Ordered, enabled provider ids; this order fixes round-robin
    /// placement (§4.F step 6b).
    pub enabled: Vec<String>,
    pub settings: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["filesystem".to_string()],
            settings: ProviderSettings {
                filesystem_base_path: Some("./chunkvault-data".to_string()),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoreConfig {
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://chunkvault.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheConfig {
    pub default_expiry_in_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { default_expiry_in_minutes: 30 }
    }
}

/// Retention policy for the optional `logs` collection (§4.B). SQLite has
/// no native TTL index, so this horizon is enforced by a periodic sweep
/// (see `CompositionRoot::build`) rather than a database feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogsConfig {
    pub retention_days: i64,
    pub sweep_interval_minutes: u64,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            sweep_interval_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChunkVaultConfig {
    pub store: StoreConfig,
    pub chunking: ChunkingConfig,
    pub distribution: DistributionConfig,
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
    pub logs: LogsConfig,
}

impl ChunkVaultConfig {
    /// Loads configuration by layering defaults, an optional TOML file, and
    /// `CHUNKVAULT_`-prefixed environment variables, in that order of
    /// increasing precedence.
    pub fn load(file_path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = ChunkVaultConfig::default();
        let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);

        if let Some(path) = file_path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("CHUNKVAULT").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_with_no_file_yields_defaults() {
        let config = ChunkVaultConfig::load(None).expect("defaults should always deserialize");
        assert_eq!(config.chunking.min_chunk_size_in_bytes, 32 * 1024);
        assert_eq!(config.distribution.max_parallel_tasks, 4);
        assert_eq!(config.providers.enabled, vec!["filesystem".to_string()]);
    }

    #[test]
    fn missing_file_path_does_not_error() {
        let missing = Path::new("/nonexistent/chunkvault-config-test.toml");
        assert!(ChunkVaultConfig::load(Some(missing)).is_ok());
    }
}
