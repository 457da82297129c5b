//! EventBus port (spec §4.D).

use crate::events::DomainEvent;
use async_trait::async_trait;

#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    async fn handle(&self, event: &E);
}

/// Publishes events to whatever handlers were registered for their
/// concrete type at startup (§9: in a static language, explicit
/// registration replaces reflection-based auto-discovery).
///
/// Dispatch invokes every handler for the event's type concurrently and
/// waits for all of them; a failing handler is isolated and logged with
/// the event's correlation id, never aborting the publish or its siblings.
///
/// This trait is generic over the event type rather than taking a type-erased
/// payload, so it is not object-safe — callers depend on a concrete bus
/// implementation (generally through a single composition-root instance),
/// not a `dyn EventBus`. That mirrors spec §4.D's typed-topic model: there
/// is one dispatch mechanism, specialized per event type at the call site.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish<E>(&self, event: E)
    where
        E: DomainEvent + Clone + 'static;
}
