// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-process event bus (§4.D): typed publish/subscribe with concurrent,
//! isolated multi-handler dispatch.

pub mod in_process_bus;

pub use in_process_bus::{HandlerRegistry, InProcessEventBus};
