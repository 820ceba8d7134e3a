// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PJRT compute backends for a tensor framework.
//!
//! Linking this crate is enough to make every compiled-in backend available:
//! the process-wide [`registry()`] registers them the first time it is used.
//! Backends are then obtained from a `<backend>[:<config>]` string, e.g.
//! `"xla:cuda,supress_logging"`, or from the configured default.
//!
//! ```no_run
//! use pjrt::ClientOptions;
//!
//! let backend = pjrt::new_backend("xla:cpu", &ClientOptions::new())?;
//! println!("{}", backend.description());
//! # Ok::<(), pjrt::PjrtError>(())
//! ```

use std::sync::LazyLock;

use pjrt_core::registry::split_backend_string;
use tracing::{debug, info};

pub use pjrt_core::{
    Backend, BackendRegistry, Client, ClientOptions, NamedValue, PjrtError, Plugin,
    PluginDescriptor, PluginResolutionError, PluginRuntime,
};

#[cfg(feature = "xla")]
pub use pjrt_xla::{self as xla, XlaBackend};

static REGISTRY: LazyLock<BackendRegistry> = LazyLock::new(|| {
    let registry = BackendRegistry::new();
    register_builtin(&registry);
    debug!(backends = ?registry.names(), "backend registry initialized");
    registry
});

/// The process-wide backend registry, with all compiled-in backends registered.
pub fn registry() -> &'static BackendRegistry {
    &REGISTRY
}

#[allow(unused_variables)]
fn register_builtin(registry: &BackendRegistry) {
    #[cfg(feature = "xla")]
    pjrt_xla::register(registry);
}

/// The configured default backend string (`backend.default`, or `PJRT_BACKEND`).
pub fn default_backend() -> Result<String, PjrtError> {
    pjrt_config::load_and_validate()
        .map(|config| config.backend.default)
        .map_err(|errors| {
            PjrtError::Config(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })
}

/// Construct a backend from a `<backend>[:<config>]` string.
///
/// An empty string selects the configured default backend with its
/// configuration; `":cpu"` selects the default backend with configuration `cpu`.
/// The configuration is only consulted when the backend name is omitted.
pub fn new_backend(backend: &str, options: &ClientOptions) -> Result<Box<dyn Backend>, PjrtError> {
    let (name, _) = split_backend_string(backend);
    let created = if name.is_empty() {
        let default = default_backend()?;
        let backend = if backend.trim().is_empty() {
            default.as_str()
        } else {
            backend
        };
        let (default_name, _) = split_backend_string(&default);
        registry().new_backend(backend, default_name, options)?
    } else {
        registry().new_backend(backend, name, options)?
    };
    info!(backend = %created.name(), description = %created.description(), "backend created");
    Ok(created)
}

/// Construct the configured default backend with no client options.
pub fn new_default_backend() -> Result<Box<dyn Backend>, PjrtError> {
    new_backend("", &ClientOptions::new())
}

#[cfg(all(test, feature = "xla"))]
mod tests {
    use super::*;

    #[test]
    fn builtin_backends_are_registered() {
        assert!(registry().contains(pjrt_xla::BACKEND_NAME));
    }

    #[test]
    fn registry_is_shared() {
        assert!(std::ptr::eq(registry(), registry()));
    }
}
