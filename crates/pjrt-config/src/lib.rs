// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for PJRT plugin discovery and backend selection.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `PJRT_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use pjrt_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("preferred plugins: {:?}", config.plugin.preferred);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::ConfigError;
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{BackendSection, PjrtConfig, PluginConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `PjrtConfig` or every diagnostic that was found.
pub fn load_and_validate() -> Result<PjrtConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    tracing::debug!(
        preferred = ?config.plugin.preferred,
        backend = %config.backend.default,
        "configuration loaded"
    );
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<PjrtConfig, Vec<ConfigError>> {
    loader::load_config_from_str(toml_content)
        .map_err(diagnostic::figment_to_config_errors)
        .and_then(|config| {
            validation::validate_config(&config)?;
            Ok(config)
        })
}
