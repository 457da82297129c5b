// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Use case for the CLI `metrics` command.

use std::sync::Arc;

use anyhow::Result;

use crate::infrastructure::ChunkVaultMetrics;

/// Renders the process's Prometheus metrics as text. `metric_type` is
/// accepted for CLI compatibility but the registry is always rendered in
/// full — chunkvault exposes too few distinct metric families to warrant
/// per-type filtering.
pub struct ShowMetricsUseCase {
    metrics: Arc<ChunkVaultMetrics>,
}

impl ShowMetricsUseCase {
    pub fn new(metrics: Arc<ChunkVaultMetrics>) -> Self {
        Self { metrics }
    }

    pub async fn execute(&self, _metric_type: &str) -> Result<String> {
        let rendered = self.metrics.render();
        println!("{}", rendered);
        Ok(rendered)
    }
}
