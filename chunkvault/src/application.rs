// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Layer
//!
//! Orchestration above the domain: [`services`] compose the `ChunkEngine`,
//! the metadata repositories, and the cache into the two workflows spec
//! §4.G/§4.H describe (`FileService`, `DirectoryIndexer`); [`use_cases`]
//! are the thin, one-per-CLI-command entry points the composition root
//! wires to `chunkvault_bootstrap`'s `ValidatedCommand`.

pub mod services;
pub mod use_cases;

pub use services::{DirectoryIndexer, FileService};
