// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide installation point for the native PJRT runtime.
//!
//! Native bindings call [`install`] once at startup; backend constructors
//! registered by name fetch the runtime through [`installed`].

use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::error::PjrtError;
use crate::traits::PluginRuntime;

static RUNTIME: OnceLock<Arc<dyn PluginRuntime>> = OnceLock::new();

/// Install the process-wide runtime. Fails if one is already installed.
pub fn install(runtime: Arc<dyn PluginRuntime>) -> Result<(), PjrtError> {
    RUNTIME
        .set(runtime)
        .map_err(|_| PjrtError::Config("a PJRT runtime is already installed".to_string()))?;
    info!("PJRT runtime installed");
    Ok(())
}

/// The installed runtime, if any.
pub fn installed() -> Option<Arc<dyn PluginRuntime>> {
    RUNTIME.get().cloned()
}
