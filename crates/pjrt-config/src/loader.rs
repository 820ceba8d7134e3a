// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy `./pjrt.toml` > `~/.config/pjrt/pjrt.toml` >
//! `/etc/pjrt/pjrt.toml`, with a fixed set of `PJRT_*` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PjrtConfig;

/// Environment variables read by the loader, and the keys they set.
///
/// `PJRT_PLUGIN_LIBRARY_PATH` is not listed: it is a path list read
/// by the plugin scanner itself.
const ENV_KEYS: &[(&str, &str)] = &[
    ("backend", "backend.default"),
    ("preferred_plugins", "plugin.preferred"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pjrt/pjrt.toml`
/// 3. `~/.config/pjrt/pjrt.toml`
/// 4. `./pjrt.toml`
/// 5. `PJRT_BACKEND` and `PJRT_PREFERRED_PLUGINS`
pub fn load_config() -> Result<PjrtConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PjrtConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PjrtConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PjrtConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PjrtConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PjrtConfig::default()))
        .merge(Toml::file("/etc/pjrt/pjrt.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pjrt/pjrt.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("pjrt.toml"))
        .merge(env_provider())
}

/// Environment provider restricted to [`ENV_KEYS`].
///
/// Variable names reach the mapping with their original case. A comma list
/// such as `PJRT_PREFERRED_PLUGINS=cuda,cpu` arrives as a plain string; the
/// model accepts both comma lists and arrays for that key.
fn env_provider() -> Env {
    Env::prefixed("PJRT_").filter_map(|key| {
        ENV_KEYS
            .iter()
            .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
            .map(|(_, mapped)| (*mapped).into())
    })
}
