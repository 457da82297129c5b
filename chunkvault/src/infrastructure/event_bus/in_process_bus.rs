// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The in-process event bus implementation.
//!
//! Rust has no runtime reflection, so the source's auto-discovery of
//! handler types is replaced by an explicit [`HandlerRegistry`] populated at
//! startup in the composition root (§9). Handlers are keyed by the event
//! type's [`TypeId`] and stored as type-erased `Any` so one registry can
//! hold handlers for every event type without a generic parameter leaking
//! into `InProcessEventBus` itself.

use chunkvault_domain::events::DomainEvent;
use chunkvault_domain::repositories::{EventBus, EventHandler};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::FutureExt;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Holds the handler set for every registered event type, type-erased.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for event type `E`. Registration only happens at
    /// startup (§5: "written only during auto-discovery, read thereafter").
    pub fn register<E>(&self, handler: Arc<dyn EventHandler<E>>)
    where
        E: DomainEvent + 'static,
    {
        self.handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(handler));
    }

    fn handlers_for<E: DomainEvent + 'static>(&self) -> Vec<Arc<dyn EventHandler<E>>> {
        match self.handlers.get(&TypeId::of::<E>()) {
            Some(entries) => entries
                .iter()
                .filter_map(|boxed| boxed.downcast_ref::<Arc<dyn EventHandler<E>>>().cloned())
                .collect(),
            None => Vec::new(),
        }
    }
}

pub struct InProcessEventBus {
    registry: Arc<HandlerRegistry>,
}

impl InProcessEventBus {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl EventBus for InProcessEventBus {
    async fn publish<E>(&self, event: E)
    where
        E: DomainEvent + Clone + 'static,
    {
        let handlers = self.registry.handlers_for::<E>();
        if handlers.is_empty() {
            return;
        }

        let correlation_id = event.correlation_id();
        let event_type = event.event_type();
        let dispatches = handlers.into_iter().map(|handler| {
            let event = event.clone();
            async move {
                // Each handler is isolated: a panic here is caught and
                // logged with the event's correlation id rather than
                // aborting sibling handlers or the publish call (§4.D).
                let outcome =
                    std::panic::AssertUnwindSafe(handler.handle(&event)).catch_unwind().await;
                if let Err(panic) = outcome {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!(
                        event_type,
                        correlation_id = %correlation_id,
                        panic = %message,
                        "event handler panicked"
                    );
                }
            }
        });

        futures::future::join_all(dispatches).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkvault_domain::events::ChunkStored;
    use chunkvault_domain::value_objects::CorrelationId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler<ChunkStored> for CountingHandler {
        async fn handle(&self, _event: &ChunkStored) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl EventHandler<ChunkStored> for PanickingHandler {
        async fn handle(&self, _event: &ChunkStored) {
            panic!("handler exploded");
        }
    }

    fn sample_event() -> ChunkStored {
        ChunkStored {
            event_id: Uuid::new_v4(),
            chunk_id: "f1_0".into(),
            file_id: "f1".into(),
            sequence: 0,
            size: 10,
            compressed_size: 10,
            checksum: "abc".into(),
            provider_id: "filesystem".into(),
            correlation_id: CorrelationId::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn dispatches_to_every_registered_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(HandlerRegistry::new());
        registry.register::<ChunkStored>(Arc::new(CountingHandler(counter.clone())));
        registry.register::<ChunkStored>(Arc::new(CountingHandler(counter.clone())));
        let bus = InProcessEventBus::new(registry);

        bus.publish(sample_event()).await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_panicking_handler_does_not_stop_its_siblings() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(HandlerRegistry::new());
        registry.register::<ChunkStored>(Arc::new(PanickingHandler));
        registry.register::<ChunkStored>(Arc::new(CountingHandler(counter.clone())));
        let bus = InProcessEventBus::new(registry);

        bus.publish(sample_event()).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn publishing_with_no_handlers_is_a_no_op() {
        let registry = Arc::new(HandlerRegistry::new());
        let bus = InProcessEventBus::new(registry);
        bus.publish(sample_event()).await;
    }
}
