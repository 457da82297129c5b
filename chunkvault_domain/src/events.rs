//! # Domain Events
//!
//! Typed event payloads published through the [`EventBus`](crate::repositories::EventBus)
//! port. Every event implements [`DomainEvent`], the capability set spec
//! §4.D requires of every published value:
//! `{eventId, eventType, timestamp, correlationId}`.
//!
//! This is a deliberately narrower event model than the donor workspace's
//! own `events::generic_event` (a full event-sourcing `DomainEvent<T>` with
//! payload/category machinery) — spec §4.D only asks for plain typed
//! pub/sub, so that is all that is implemented here.

use crate::value_objects::CorrelationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability set every published event value implements.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    fn event_id(&self) -> Uuid;
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> DateTime<Utc>;
    fn correlation_id(&self) -> CorrelationId;
}

macro_rules! impl_domain_event {
    ($ty:ty, $name:literal) => {
        impl DomainEvent for $ty {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn event_type(&self) -> &'static str {
                $name
            }
            fn timestamp(&self) -> DateTime<Utc> {
                self.timestamp
            }
            fn correlation_id(&self) -> CorrelationId {
                self.correlation_id
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkStored {
    pub event_id: Uuid,
    pub chunk_id: String,
    pub file_id: String,
    pub sequence: u32,
    pub size: u64,
    pub compressed_size: u64,
    pub checksum: String,
    pub provider_id: String,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}
impl_domain_event!(ChunkStored, "ChunkStored");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessed {
    pub event_id: Uuid,
    pub file_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub checksum: String,
    pub chunk_count: u32,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}
impl_domain_event!(FileProcessed, "FileProcessed");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryScan {
    pub event_id: Uuid,
    pub path: String,
    pub file_count: u64,
    pub directory_count: u64,
    pub total_size: u64,
    pub processed_content: bool,
    pub recursive: bool,
    pub elapsed_ms: u64,
    pub chunk_count: u64,
    pub error_count: u64,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}
impl_domain_event!(DirectoryScan, "DirectoryScan");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiscovered {
    pub event_id: Uuid,
    pub file_id: String,
    pub file_path: String,
    pub file_name: String,
    pub file_size: u64,
    pub extension: Option<String>,
    pub content_type: Option<String>,
    pub checksum: Option<String>,
    pub was_processed: bool,
    pub chunk_count: u32,
    pub status: String,
    pub parent_id: Option<String>,
    pub tags: Vec<String>,
    pub elapsed_ms: u64,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}
impl_domain_event!(FileDiscovered, "FileDiscovered");
