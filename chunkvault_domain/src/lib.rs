//! # chunkvault-domain
//!
//! Pure, reusable business logic for the chunk pipeline: entities, value
//! objects, domain events, domain services, and the narrow repository
//! ports the application layer depends on. Nothing in this crate talks to
//! a disk, a database, or the network — those are infrastructure concerns
//! that live in the `chunkvault` crate and implement the traits declared
//! here.

pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::ChunkVaultError;
