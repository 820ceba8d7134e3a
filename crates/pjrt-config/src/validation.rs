// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::PjrtConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &PjrtConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for (i, name) in config.plugin.preferred.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("plugin.preferred[{i}] must not be empty"),
            });
        } else if !seen.insert(name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate plugin `{name}` in plugin.preferred"),
            });
        }
    }

    for (i, path) in config.plugin.search_paths.iter().enumerate() {
        if path.as_os_str().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("plugin.search_paths[{i}] must not be empty"),
            });
        }
    }

    if config.plugin.default_dir.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "plugin.default_dir must not be empty".to_string(),
        });
    }

    if config.backend.default.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.default must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
