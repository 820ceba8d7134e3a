// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds an [`XlaBackend`] from a plugin name, option tokens, and client options.

use pjrt_core::{ClientOptions, PluginResolutionError, PluginRuntime};
use tracing::{debug, info};

use crate::BACKEND_NAME;
use crate::backend::XlaBackend;
use crate::catalog::PluginCatalog;
use crate::options::{BackendConfig, SUPPRESS_LOGGING_OPTION};

/// Plugin whose client creation floods stderr with runtime diagnostics.
const CPU_PLUGIN: &str = "cpu";

/// Plugin that always gets quiet compilation.
const CUDA_PLUGIN: &str = "cuda";

/// Resolves a plugin against a catalog and opens a client on it.
pub struct ClientFactory<'a> {
    catalog: &'a PluginCatalog,
    runtime: &'a dyn PluginRuntime,
}

impl<'a> ClientFactory<'a> {
    /// Factory selecting from `catalog` and loading through `runtime`.
    pub fn new(catalog: &'a PluginCatalog, runtime: &'a dyn PluginRuntime) -> Self {
        Self { catalog, runtime }
    }

    /// Build a backend from a `<plugin>[,<option>]*` configuration string.
    pub fn build_from_config(
        &self,
        config: &str,
        client_options: &ClientOptions,
    ) -> Result<XlaBackend, PluginResolutionError> {
        let config = BackendConfig::parse(config);
        self.build(&config.plugin_name, &config.options, client_options)
    }

    /// Select a plugin and construct a client on it.
    ///
    /// An empty `plugin_name` selects the first available plugin. Either a
    /// complete backend is returned or nothing is.
    ///
    /// Creating a `cpu` client silences the runtime's process-wide diagnostic
    /// logging for the duration of the call. Callers building `cpu` backends
    /// from several threads must serialize those calls themselves.
    pub fn build(
        &self,
        plugin_name: &str,
        options: &[String],
        client_options: &ClientOptions,
    ) -> Result<XlaBackend, PluginResolutionError> {
        let descriptor = self.catalog.resolve(plugin_name)?;
        let name = descriptor.name().to_string();

        let plugin = self.runtime.load_plugin(descriptor).map_err(|e| {
            PluginResolutionError::PluginLookupFailed {
                backend: BACKEND_NAME.to_string(),
                plugin: name.clone(),
                source: Box::new(e),
            }
        })?;

        let option_kinds: Vec<String> = client_options
            .iter()
            .map(|(key, value)| format!("{key}: {}", value.kind()))
            .collect();
        debug!(plugin = %name, options = ?option_kinds, "creating PJRT client");
        let client = if name == CPU_PLUGIN {
            let _quiet = self.runtime.suppress_diagnostics();
            plugin.create_client(client_options)
        } else {
            plugin.create_client(client_options)
        }
        .map_err(|e| PluginResolutionError::ClientConstructionFailed {
            backend: BACKEND_NAME.to_string(),
            plugin: name.clone(),
            source: Box::new(e),
        })?;

        let suppress_logging =
            name == CUDA_PLUGIN || options.iter().any(|o| o == SUPPRESS_LOGGING_OPTION);
        info!(
            backend = BACKEND_NAME,
            plugin = %name,
            platform = %client.platform_name(),
            suppress_logging,
            "PJRT client created"
        );
        Ok(XlaBackend::new(plugin, client, name, suppress_logging))
    }
}
