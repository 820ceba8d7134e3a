// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for PJRT compute backends.
//!
//! This crate provides the trait seams to the native PJRT runtime, the error
//! types, the option and descriptor types shared by backend implementations,
//! and the name-keyed [`BackendRegistry`] through which a framework obtains a
//! backend from a configuration string.

pub mod error;
pub mod registry;
pub mod runtime;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{PjrtError, PluginResolutionError};
pub use registry::{BackendConstructor, BackendRegistry};
pub use types::{ClientOptions, NamedValue, PluginDescriptor};

pub use traits::{Backend, Client, DiagnosticsGuard, Plugin, PluginRuntime};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pjrt_error_has_all_variants() {
        let _config = PjrtError::Config("test".into());
        let _runtime = PjrtError::Runtime {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _not_found = PjrtError::BackendNotFound {
            name: "test".into(),
            available: vec![],
        };
        let _resolution = PjrtError::Resolution(PluginResolutionError::NoPluginsFound {
            backend: "xla".into(),
        });
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_runtime<T: PluginRuntime>() {}
        fn _assert_plugin<T: Plugin>() {}
        fn _assert_client<T: Client>() {}
        fn _assert_backend<T: Backend>() {}
    }
}
