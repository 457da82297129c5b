// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite schema management (`sqlx::migrate!`), reused near-verbatim from
//! the donor workspace's own database bootstrap module.

pub mod schema;

pub use schema::{create_database_if_missing, ensure_schema, initialize_database};
