// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration of the XLA backend under [`BACKEND_NAME`].

use std::sync::Arc;

use pjrt_core::{Backend, BackendRegistry, ClientOptions, PjrtError, PluginRuntime};

use crate::BACKEND_NAME;
use crate::catalog::PluginCatalog;
use crate::factory::ClientFactory;

/// Register the XLA backend using the process-wide catalog and runtime.
///
/// Returns true if an earlier `"xla"` registration was replaced.
pub fn register(registry: &BackendRegistry) -> bool {
    registry.register(BACKEND_NAME, Arc::new(construct))
}

/// Register the XLA backend against an explicit catalog and runtime.
pub fn register_with(
    registry: &BackendRegistry,
    catalog: &'static PluginCatalog,
    runtime: Arc<dyn PluginRuntime>,
) -> bool {
    let constructor =
        move |config: &str, options: &ClientOptions| -> Result<Box<dyn Backend>, PjrtError> {
            let factory = ClientFactory::new(catalog, runtime.as_ref());
            Ok(Box::new(factory.build_from_config(config, options)?))
        };
    registry.register(BACKEND_NAME, Arc::new(constructor))
}

fn construct(config: &str, options: &ClientOptions) -> Result<Box<dyn Backend>, PjrtError> {
    let backend = crate::new_backend_with_options(config, options)?;
    Ok(Box::new(backend))
}
