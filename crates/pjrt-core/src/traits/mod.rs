// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between backend implementations, the native PJRT runtime, and
//! the framework that consumes backends.

pub mod backend;
pub mod runtime;

pub use backend::Backend;
pub use runtime::{Client, DiagnosticsGuard, Plugin, PluginRuntime};
