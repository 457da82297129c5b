// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics (§4.I ambient metrics collection). A much smaller
//! surface than a full collector/exporter stack: counters and a histogram
//! for the handful of things §8's testable properties actually care about
//! observing — chunks placed, bytes processed, split/merge durations, and
//! failures by error category.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

pub struct ChunkVaultMetrics {
    pub registry: Registry,
    pub files_uploaded_total: IntCounter,
    pub files_downloaded_total: IntCounter,
    pub chunks_stored_total: IntCounter,
    pub bytes_stored_total: IntCounter,
    pub errors_total: IntCounterVec,
    pub split_duration_seconds: Histogram,
    pub merge_duration_seconds: Histogram,
}

impl ChunkVaultMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let files_uploaded_total =
            IntCounter::with_opts(Opts::new("chunkvault_files_uploaded_total", "Files successfully uploaded"))?;
        let files_downloaded_total = IntCounter::with_opts(Opts::new(
            "chunkvault_files_downloaded_total",
            "Files successfully downloaded",
        ))?;
        let chunks_stored_total =
            IntCounter::with_opts(Opts::new("chunkvault_chunks_stored_total", "Chunks placed with a provider"))?;
        let bytes_stored_total =
            IntCounter::with_opts(Opts::new("chunkvault_bytes_stored_total", "Uncompressed bytes processed"))?;
        let errors_total = IntCounterVec::new(
            Opts::new("chunkvault_errors_total", "Errors by category"),
            &["category"],
        )?;
        let split_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "chunkvault_split_duration_seconds",
            "Time spent splitting a file into chunks",
        ))?;
        let merge_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "chunkvault_merge_duration_seconds",
            "Time spent reassembling a file from chunks",
        ))?;

        registry.register(Box::new(files_uploaded_total.clone()))?;
        registry.register(Box::new(files_downloaded_total.clone()))?;
        registry.register(Box::new(chunks_stored_total.clone()))?;
        registry.register(Box::new(bytes_stored_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(split_duration_seconds.clone()))?;
        registry.register(Box::new(merge_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            files_uploaded_total,
            files_downloaded_total,
            chunks_stored_total,
            bytes_stored_total,
            errors_total,
            split_duration_seconds,
            merge_duration_seconds,
        })
    }

    pub fn record_error(&self, category: &str) {
        self.errors_total.with_label_values(&[category]).inc();
    }

    /// Renders the registry in the Prometheus text exposition format, for
    /// the `metrics` CLI command and any future scrape endpoint.
    pub fn render(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).expect("prometheus text encoding never fails for valid metrics");
        String::from_utf8(buffer).expect("prometheus text encoder always emits valid UTF-8")
    }
}
