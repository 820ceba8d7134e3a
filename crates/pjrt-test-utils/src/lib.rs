// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for PJRT backend tests.
//!
//! Provides a mock runtime and temporary plugin directories so discovery and
//! client construction can be tested without any native PJRT library.
//!
//! # Components
//!
//! - [`MockRuntime`] - In-memory runtime with scripted failures and call recording
//! - [`PluginDir`] - Temporary directory populated with fake plugin files

pub mod mock_runtime;
pub mod plugin_dir;

pub use mock_runtime::{MockClient, MockPlugin, MockRuntime};
pub use plugin_dir::PluginDir;
