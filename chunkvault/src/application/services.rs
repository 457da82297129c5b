// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services: stateful workflow coordinators composed from
//! domain ports, one per workflow (spec §4.G, §4.H).

pub mod directory_indexer;
pub mod file_service;

pub use directory_indexer::DirectoryIndexer;
pub use file_service::FileService;
