// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Concrete `StorageProvider` adapters (§4.A): filesystem, a GridFS-style
//! object-store bucket realized over `sqlx`, and remote object storage over
//! `aws-sdk-s3`.

pub mod filesystem;
pub mod gridfs;
pub mod remote_object;

pub use filesystem::FilesystemProvider;
pub use gridfs::GridFsProvider;
pub use remote_object::RemoteObjectProvider;
