// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PjrtConfig {
    /// Plugin discovery and selection settings.
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Framework-level backend selection.
    #[serde(default)]
    pub backend: BackendSection,
}

/// Where to look for PJRT plugins and which to prefer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Directories searched instead of the defaults, in priority order.
    /// Ignored when `PJRT_PLUGIN_LIBRARY_PATH` is set.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// First directory searched when no explicit search path is configured.
    #[serde(default = "default_plugin_dir")]
    pub default_dir: PathBuf,

    /// Also search the system shared-library locations after `default_dir`.
    #[serde(default = "default_true")]
    pub system_paths: bool,

    /// Plugins picked first, in order, when no plugin is requested by name.
    #[serde(
        default = "default_preferred",
        deserialize_with = "deserialize_name_list"
    )]
    pub preferred: Vec<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            default_dir: default_plugin_dir(),
            system_paths: true,
            preferred: default_preferred(),
        }
    }
}

/// Backend used when the framework is asked for one without a name.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    /// Backend string in `<backend>[:<config>]` form, e.g. `xla:cpu`.
    #[serde(default = "default_backend")]
    pub default: String,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            default: default_backend(),
        }
    }
}

fn default_plugin_dir() -> PathBuf {
    PathBuf::from("/usr/local/lib/pjrt")
}

fn default_true() -> bool {
    true
}

fn default_preferred() -> Vec<String> {
    vec!["cuda".to_string(), "cpu".to_string()]
}

fn default_backend() -> String {
    "xla".to_string()
}

/// Accept either a TOML array or a comma-separated string (env overrides).
fn deserialize_name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NameList {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match NameList::deserialize(deserializer)? {
        NameList::List(names) => names,
        NameList::Csv(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
