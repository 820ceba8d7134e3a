// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! XLA backend built on PJRT plugins.
//!
//! Discovers installed PJRT plugin libraries, selects one by name or by
//! preference (`cuda`, then `cpu`, then the rest), and opens a client on it
//! through a [`PluginRuntime`](pjrt_core::PluginRuntime): the one installed
//! with `pjrt_core::runtime::install`, or else (with the default `dylib`
//! feature) [`DylibRuntime`], which opens plugin libraries directly.
//!
//! The configuration string is `<plugin>[,<option>]*`, e.g.
//! `"cuda,supress_logging"`; an empty plugin name picks the first available
//! plugin.

pub mod backend;
pub mod catalog;
#[cfg(feature = "dylib")]
pub mod dylib;
pub mod factory;
pub mod options;
pub mod registrar;
pub mod scanner;

pub use backend::XlaBackend;
pub use catalog::{list_available, PluginCatalog};
#[cfg(feature = "dylib")]
pub use dylib::DylibRuntime;
pub use factory::ClientFactory;
pub use options::{BackendConfig, SUPPRESS_LOGGING_OPTION};
pub use registrar::{register, register_with};
pub use scanner::{PluginScanner, PLUGIN_PATH_ENV};

use std::sync::Arc;

use pjrt_core::{ClientOptions, PjrtError, PluginResolutionError, PluginRuntime};

/// Name the backend is registered under.
pub const BACKEND_NAME: &str = "xla";

/// Create an XLA backend from a configuration string with no client options.
pub fn new_backend(config: &str) -> Result<XlaBackend, PjrtError> {
    new_backend_with_options(config, &ClientOptions::new())
}

/// Create an XLA backend with the process-wide catalog and runtime.
///
/// Plugin selection runs first, so a missing plugin is reported as such even
/// when no runtime is available.
pub fn new_backend_with_options(
    config: &str,
    client_options: &ClientOptions,
) -> Result<XlaBackend, PjrtError> {
    let catalog = PluginCatalog::global();
    match runtime() {
        Some(runtime) => Ok(ClientFactory::new(catalog, runtime.as_ref())
            .build_from_config(config, client_options)?),
        None => {
            let config = BackendConfig::parse(config);
            let descriptor = catalog.resolve(&config.plugin_name)?;
            Err(PluginResolutionError::PluginLookupFailed {
                backend: BACKEND_NAME.to_string(),
                plugin: descriptor.name().to_string(),
                source: Box::new(PjrtError::runtime(
                    "no PJRT runtime installed (see pjrt_core::runtime::install)",
                )),
            }
            .into())
        }
    }
}

/// The installed runtime, falling back to the built-in library loader.
fn runtime() -> Option<Arc<dyn PluginRuntime>> {
    pjrt_core::runtime::installed().or_else(builtin_runtime)
}

#[cfg(feature = "dylib")]
fn builtin_runtime() -> Option<Arc<dyn PluginRuntime>> {
    use std::sync::LazyLock;

    static DYLIB: LazyLock<Arc<DylibRuntime>> = LazyLock::new(|| Arc::new(DylibRuntime::new()));
    Some(DYLIB.clone())
}

#[cfg(not(feature = "dylib"))]
fn builtin_runtime() -> Option<Arc<dyn PluginRuntime>> {
    None
}
