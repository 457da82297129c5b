// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! TTL cache with per-key single-flight writes and coalesced deletes
//! (§4.C). Keys are file-metadata, chunk-metadata, per-file chunk lists,
//! directory child lists, and boolean integrity verdicts, all serialized as
//! JSON strings by the caller — this layer is deliberately value-agnostic.

use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::repositories::Cache;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};

const DEFAULT_MAX_BATCH_SIZE: usize = 100;
const DEFAULT_COOLDOWN: Duration = Duration::from_millis(50);

struct Entry {
    value: String,
    expires_at: Instant,
}

/// A `dashmap`-backed cache. `get`/`set`/`refresh_ttl` operate directly on
/// the map; `delete` enqueues onto a bounded channel drained by a
/// background task that flushes on whichever comes first: reaching
/// `max_batch_size` or the `cooldown` timer elapsing (§4.C).
pub struct TtlCache {
    entries: Arc<DashMap<String, Entry>>,
    write_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    delete_tx: mpsc::Sender<String>,
    default_ttl: Duration,
}

impl TtlCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_batching(default_ttl, DEFAULT_MAX_BATCH_SIZE, DEFAULT_COOLDOWN)
    }

    pub fn with_batching(default_ttl: Duration, max_batch_size: usize, cooldown: Duration) -> Self {
        let entries = Arc::new(DashMap::new());
        let (delete_tx, delete_rx) = mpsc::channel(max_batch_size * 4);

        tokio::spawn(Self::run_delete_flusher(entries.clone(), delete_rx, max_batch_size, cooldown));

        Self {
            entries,
            write_locks: Arc::new(DashMap::new()),
            delete_tx,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    async fn run_delete_flusher(
        entries: Arc<DashMap<String, Entry>>,
        mut rx: mpsc::Receiver<String>,
        max_batch_size: usize,
        cooldown: Duration,
    ) {
        let mut batch = Vec::with_capacity(max_batch_size);
        loop {
            tokio::select! {
                received = rx.recv() => {
                    match received {
                        Some(key) => {
                            batch.push(key);
                            if batch.len() >= max_batch_size {
                                Self::flush(&entries, &mut batch);
                            }
                        }
                        None => {
                            Self::flush(&entries, &mut batch);
                            return;
                        }
                    }
                }
                _ = tokio::time::sleep(cooldown), if !batch.is_empty() => {
                    Self::flush(&entries, &mut batch);
                }
            }
        }
    }

    fn flush(entries: &DashMap<String, Entry>, batch: &mut Vec<String>) {
        for key in batch.drain(..) {
            entries.remove(&key);
        }
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.write_locks.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[async_trait]
impl Cache for TtlCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), ChunkVaultError> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ChunkVaultError> {
        self.delete_tx
            .send(key.to_string())
            .await
            .map_err(|_| ChunkVaultError::transient_io("cache delete flusher channel closed"))
    }

    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<bool, ChunkVaultError> {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Instant::now() + ttl;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
