//! A minimal, tokio-free cancellation token for the domain layer.
//!
//! Every public operation in the engine accepts one of these and checks it
//! cooperatively before and after each suspending call (§5). This is
//! deliberately simpler than the bootstrap layer's own
//! `ShutdownCoordinator`/`CancellationToken` pair (which uses
//! `tokio::sync::Notify` for async waiting and lives outside the domain
//! crate): the domain only needs to *observe* cancellation, never to await
//! it, so it does not need a tokio dependency.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(ChunkVaultError::Cancelled)` if the token has been
    /// cancelled; otherwise `Ok(())`. Intended to be called at every
    /// suspension point inside the engine.
    pub fn check(&self) -> Result<(), crate::error::ChunkVaultError> {
        if self.is_cancelled() {
            Err(crate::error::ChunkVaultError::cancelled("operation cancelled"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_observed_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn check_fails_after_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(token.check().is_err());
    }
}
