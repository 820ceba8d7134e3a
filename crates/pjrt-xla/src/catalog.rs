// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide snapshot of the available PJRT plugins.
//!
//! The first query runs the scanner and orders the result: preferred plugins
//! first, in preference order, then everything else sorted by name. The
//! snapshot is never refreshed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use pjrt_config::PluginConfig;
use pjrt_core::{PluginDescriptor, PluginResolutionError};
use tracing::{info, warn};

use crate::BACKEND_NAME;
use crate::scanner::PluginScanner;

/// Lazily computed, immutable list of available plugins.
#[derive(Debug)]
pub struct PluginCatalog {
    scanner: PluginScanner,
    preferred: Vec<String>,
    snapshot: OnceLock<Snapshot>,
}

#[derive(Debug)]
struct Snapshot {
    available: Vec<String>,
    descriptors: BTreeMap<String, PluginDescriptor>,
}

static GLOBAL: OnceLock<PluginCatalog> = OnceLock::new();

impl PluginCatalog {
    /// Catalog over `scanner`, preferring `preferred` in that order.
    ///
    /// Plugin names are case-insensitive; preferred names are lowercased to
    /// match discovered ones.
    pub fn new(scanner: PluginScanner, preferred: Vec<String>) -> Self {
        Self {
            scanner,
            preferred: preferred
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            snapshot: OnceLock::new(),
        }
    }

    /// Catalog using the search paths and preference list of `config`.
    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(PluginScanner::from_config(config), config.preferred.clone())
    }

    /// The process-wide catalog, built from the loaded configuration.
    ///
    /// An invalid configuration is logged and replaced by the defaults.
    pub fn global() -> &'static PluginCatalog {
        GLOBAL.get_or_init(|| {
            let config = match pjrt_config::load_and_validate() {
                Ok(config) => config.plugin,
                Err(errors) => {
                    for error in &errors {
                        warn!(error = %error, "invalid configuration, using plugin defaults");
                    }
                    PluginConfig::default()
                }
            };
            PluginCatalog::from_config(&config)
        })
    }

    /// Preference list used for ordering.
    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    /// Available plugin names, preferred ones first.
    ///
    /// The scan happens on the first call only; every later call, from any
    /// thread, returns the same sequence.
    pub fn list_available(&self) -> &[String] {
        &self.snapshot().available
    }

    /// Descriptor of an available plugin.
    pub fn descriptor(&self, name: &str) -> Option<&PluginDescriptor> {
        self.snapshot().descriptors.get(name)
    }

    /// Select a plugin: `requested` (matched case-insensitively), or the first
    /// available one when empty.
    ///
    /// An empty catalog is reported as [`PluginResolutionError::NoPluginsFound`]
    /// even when a plugin was requested by name.
    pub fn resolve(&self, requested: &str) -> Result<&PluginDescriptor, PluginResolutionError> {
        let available = self.list_available();
        let Some(first) = available.first() else {
            return Err(PluginResolutionError::NoPluginsFound {
                backend: BACKEND_NAME.to_string(),
            });
        };

        let name = if requested.is_empty() {
            first.clone()
        } else {
            requested.to_ascii_lowercase()
        };
        self.descriptor(&name)
            .ok_or_else(|| PluginResolutionError::PluginNotFound {
                backend: BACKEND_NAME.to_string(),
                requested: requested.to_string(),
                available: available.to_vec(),
            })
    }

    fn snapshot(&self) -> &Snapshot {
        self.snapshot.get_or_init(|| {
            let descriptors = self.scanner.discover();
            let available = order_plugins(&self.preferred, descriptors.keys().cloned());
            info!(
                plugins = ?available,
                search_paths = ?self.scanner.search_paths(),
                "PJRT plugins discovered"
            );
            Snapshot {
                available,
                descriptors,
            }
        })
    }
}

/// Order `discovered` names: `preferred` ones first (in preference order),
/// the rest sorted by name. Preferred names that were not discovered are
/// skipped and no name appears twice.
pub fn order_plugins(
    preferred: &[String],
    discovered: impl IntoIterator<Item = String>,
) -> Vec<String> {
    let mut remaining: BTreeSet<String> = discovered.into_iter().collect();
    let mut ordered = Vec::with_capacity(remaining.len());
    for name in preferred {
        if remaining.remove(name) {
            ordered.push(name.clone());
        }
    }
    ordered.extend(remaining);
    ordered
}

/// Available plugins of the process-wide catalog.
pub fn list_available() -> &'static [String] {
    PluginCatalog::global().list_available()
}
