// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The XLA backend handle handed to the framework.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use pjrt_core::{Backend, Client, PjrtError, Plugin};
use tracing::info;

use crate::BACKEND_NAME;

/// A live XLA backend: the selected plugin and a client session on it.
///
/// The logging flag is advisory; graph compilation reads it to decide whether
/// to silence compiler output.
pub struct XlaBackend {
    plugin: Arc<dyn Plugin>,
    client: Option<Box<dyn Client>>,
    plugin_name: String,
    suppress_logging: bool,
}

impl XlaBackend {
    pub(crate) fn new(
        plugin: Arc<dyn Plugin>,
        client: Box<dyn Client>,
        plugin_name: String,
        suppress_logging: bool,
    ) -> Self {
        Self {
            plugin,
            client: Some(client),
            plugin_name,
            suppress_logging,
        }
    }

    /// Name of the plugin this backend runs on.
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Whether compilation logging should be suppressed.
    pub fn suppress_logging(&self) -> bool {
        self.suppress_logging
    }

    /// Override the logging flag chosen at construction.
    pub fn set_suppress_logging(&mut self, suppress_logging: bool) -> &mut Self {
        self.suppress_logging = suppress_logging;
        self
    }

    /// The loaded plugin.
    pub fn plugin(&self) -> &Arc<dyn Plugin> {
        &self.plugin
    }

    /// The client session, until [`Backend::finalize`] is called.
    pub fn client(&self) -> Option<&dyn Client> {
        self.client.as_deref()
    }
}

impl Backend for XlaBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn description(&self) -> String {
        match &self.client {
            Some(client) => format!(
                "{BACKEND_NAME}:{} - {} {} [{} device(s)]",
                self.plugin_name,
                client.platform_name(),
                client.platform_version(),
                client.device_count(),
            ),
            None => format!("{BACKEND_NAME}:{} (finalized)", self.plugin_name),
        }
    }

    fn finalize(&mut self) -> Result<(), PjrtError> {
        if let Some(mut client) = self.client.take() {
            client.destroy()?;
            info!(backend = BACKEND_NAME, plugin = %self.plugin_name, "PJRT client destroyed");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for XlaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XlaBackend")
            .field("plugin_name", &self.plugin_name)
            .field("plugin_path", &self.plugin.path())
            .field("client", &self.client.is_some())
            .field("suppress_logging", &self.suppress_logging)
            .finish()
    }
}
