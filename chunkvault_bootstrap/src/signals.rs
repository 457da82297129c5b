// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signal Handling
//!
//! Listens for `SIGTERM`, `SIGINT`, and (on Unix) `SIGHUP`, and drives the
//! [`ShutdownCoordinator`] from [`crate::shutdown`] on receipt of any of
//! them. Windows only has a meaningful Ctrl-C equivalent, so `SIGHUP` is a
//! no-op there.

use crate::shutdown::ShutdownCoordinator;
use std::sync::Arc;

/// Spawns a task that awaits shutdown signals and triggers
/// `coordinator.initiate_shutdown()` on the first one received. Returns the
/// `JoinHandle` so callers can await it during their own shutdown sequence
/// if they want to know a signal was actually what triggered the shutdown
/// (as opposed to, say, a completed work queue).
pub fn install_shutdown_signal_handler(coordinator: Arc<ShutdownCoordinator>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_any_signal().await;
        coordinator.initiate_shutdown();
    })
}

#[cfg(unix)]
async fn wait_for_any_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    tokio::select! {
        _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "shutdown signal received"),
        _ = sigint.recv() => tracing::info!(signal = "SIGINT", "shutdown signal received"),
        _ = sighup.recv() => tracing::info!(signal = "SIGHUP", "shutdown signal received"),
    }
}

#[cfg(not(unix))]
async fn wait_for_any_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "CTRL_C", "shutdown signal received"),
        Err(err) => tracing::warn!(error = %err, "failed to listen for ctrl-c, shutdown signal disabled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn installs_without_panicking() {
        let coordinator = Arc::new(ShutdownCoordinator::new(Duration::from_millis(50)));
        let handle = install_shutdown_signal_handler(coordinator.clone());
        // The handler is parked awaiting a signal; it should not resolve on
        // its own, and the coordinator should not yet be shutting down.
        assert!(!coordinator.is_shutting_down());
        handle.abort();
    }
}
