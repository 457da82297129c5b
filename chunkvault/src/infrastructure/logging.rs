// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Observability: Correlation-Scoped Logging (§4.I)
//!
//! Every public operation establishes a correlation-scoped logging context
//! identified by a UUID, and every log record, event, and store operation
//! propagates it. Rather than a hand-rolled thread-local, this uses
//! `tracing`'s own span-local storage: [`begin_scope`] enters an
//! `info_span!` carrying the correlation id and returns the guard, so every
//! `tracing` call made while the guard is alive is automatically tagged.

use chunkvault_domain::value_objects::CorrelationId;
use tracing::span::EnteredSpan;
use tracing_subscriber::EnvFilter;

/// Enters a correlation-scoped span for the duration the returned guard is
/// held. Drop the guard (end of scope) to leave it.
pub fn begin_scope(operation: &'static str, correlation_id: CorrelationId) -> EnteredSpan {
    tracing::info_span!("op", name = operation, correlation_id = %correlation_id).entered()
}

/// Initializes the global `tracing` subscriber. `json` selects a
/// machine-readable formatter (for log aggregators); otherwise a
/// human-readable one is used. Respects `RUST_LOG` via `EnvFilter`, falling
/// back to `info` (or `debug` when `verbose` is set).
pub fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Outcome recorded by an [`OperationTimer`] on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Fail,
}

/// Reports start, end, elapsed time, and outcome for one operation (§4.I).
/// Construct at the top of a use case, call [`OperationTimer::finish`] (or
/// [`OperationTimer::fail`]) on every exit path.
pub struct OperationTimer {
    operation: &'static str,
    correlation_id: CorrelationId,
    started_at: std::time::Instant,
    outcome: Option<Outcome>,
}

impl OperationTimer {
    pub fn start(operation: &'static str, correlation_id: CorrelationId) -> Self {
        tracing::debug!(operation, correlation_id = %correlation_id, "operation started");
        Self {
            operation,
            correlation_id,
            started_at: std::time::Instant::now(),
            outcome: None,
        }
    }

    /// Marks the operation as failed explicitly without emitting yet; the
    /// log line is emitted once, on `Drop`, so callers can call this from
    /// deep inside error-handling code without worrying about double
    /// logging.
    pub fn fail(&mut self) {
        self.outcome = Some(Outcome::Fail);
    }

    pub fn finish(mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let outcome = self.outcome.unwrap_or(Outcome::Ok);
        match outcome {
            Outcome::Ok => tracing::info!(
                operation = self.operation,
                correlation_id = %self.correlation_id,
                elapsed_ms,
                "operation completed"
            ),
            Outcome::Fail => tracing::warn!(
                operation = self.operation,
                correlation_id = %self.correlation_id,
                elapsed_ms,
                "operation failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_defaults_to_ok_outcome_on_drop() {
        let timer = OperationTimer::start("test.op", CorrelationId::new());
        drop(timer);
    }

    #[test]
    fn timer_records_explicit_failure() {
        let mut timer = OperationTimer::start("test.op", CorrelationId::new());
        timer.fail();
        drop(timer);
    }

    #[test]
    fn begin_scope_does_not_panic() {
        let _guard = begin_scope("test.scope", CorrelationId::new());
    }
}
