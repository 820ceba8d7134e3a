// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for PJRT backend discovery and construction.

use thiserror::Error;

/// The primary error type used across the runtime traits and the backend registry.
#[derive(Debug, Error)]
pub enum PjrtError {
    /// Configuration errors (invalid TOML, bad option values, duplicate installs).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failures reported by the native PJRT runtime (library load, C API errors).
    #[error("runtime error: {message}")]
    Runtime {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested backend was not found in the backend registry.
    #[error("backend {name:?} not registered: available backends {available:?}")]
    BackendNotFound { name: String, available: Vec<String> },

    /// Plugin selection or client construction failed.
    #[error(transparent)]
    Resolution(#[from] PluginResolutionError),
}

impl PjrtError {
    /// Build a [`PjrtError::Runtime`] without an underlying cause.
    pub fn runtime(message: impl Into<String>) -> Self {
        PjrtError::Runtime {
            message: message.into(),
            source: None,
        }
    }
}

/// Failures of plugin selection and client construction.
///
/// None of these are retried. Every variant carries the backend name so the
/// rendered message is enough to diagnose an installation problem.
#[derive(Debug, Error)]
pub enum PluginResolutionError {
    /// Discovery found no plugin at all.
    #[error(
        "no plugins found for backend {backend:?}: set PJRT_PLUGIN_LIBRARY_PATH (or \
         plugin.search_paths in pjrt.toml) to the directories holding the PJRT plugins, \
         or install a plugin into the default plugin directory"
    )]
    NoPluginsFound { backend: String },

    /// A plugin was requested by name but discovery did not find it.
    #[error("plugin {requested:?} for backend {backend:?} not found: available plugins {available:?}")]
    PluginNotFound {
        backend: String,
        requested: String,
        available: Vec<String>,
    },

    /// The runtime could not produce a handle for the selected plugin.
    #[error("backend {backend:?}: failed to load plugin {plugin:?}: {source}")]
    PluginLookupFailed {
        backend: String,
        plugin: String,
        source: Box<PjrtError>,
    },

    /// The plugin could not create a client.
    #[error("backend {backend:?}: failed to create client for plugin {plugin:?}: {source}")]
    ClientConstructionFailed {
        backend: String,
        plugin: String,
        source: Box<PjrtError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_not_found_lists_requested_and_available() {
        let err = PluginResolutionError::PluginNotFound {
            backend: "xla".into(),
            requested: "rocm".into(),
            available: vec!["cpu".into(), "tpu".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"rocm\""), "got: {msg}");
        assert!(msg.contains("\"cpu\""), "got: {msg}");
        assert!(msg.contains("\"tpu\""), "got: {msg}");
        assert!(msg.contains("\"xla\""), "got: {msg}");
    }

    #[test]
    fn no_plugins_found_names_the_search_path_variable() {
        let err = PluginResolutionError::NoPluginsFound {
            backend: "xla".into(),
        };
        assert!(err.to_string().contains("PJRT_PLUGIN_LIBRARY_PATH"));
    }

    #[test]
    fn wrapped_failures_keep_backend_and_cause() {
        let err = PluginResolutionError::ClientConstructionFailed {
            backend: "xla".into(),
            plugin: "cuda".into(),
            source: Box::new(PjrtError::runtime("no CUDA device visible")),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"xla\""));
        assert!(msg.contains("\"cuda\""));
        assert!(msg.contains("no CUDA device visible"));

        use std::error::Error as _;
        assert!(err.source().is_some());
    }

    #[test]
    fn resolution_error_is_transparent_inside_pjrt_error() {
        let inner = PluginResolutionError::NoPluginsFound {
            backend: "xla".into(),
        };
        let expected = inner.to_string();
        let err: PjrtError = inner.into();
        assert_eq!(err.to_string(), expected);
    }
}
