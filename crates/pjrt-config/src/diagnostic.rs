// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error rendered through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(pjrt::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key, with its section (e.g. `plugin.prefered`).
        key: String,
        /// Closest valid key, if any is close enough.
        suggestion: Option<String>,
        /// Comma-separated valid keys for the section.
        valid_keys: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(pjrt::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(pjrt::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(pjrt::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let suggestion = suggest_key(field, expected);
                    // The path usually ends at the unknown field itself.
                    let key = if error.path.last() == Some(field) {
                        path
                    } else if path.is_empty() {
                        field.clone()
                    } else {
                        format!("{path}.{field}")
                    };
                    ConfigError::UnknownKey {
                        key,
                        suggestion,
                        valid_keys: expected.join(", "),
                    }
                }
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: path,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Suggest the valid key closest to `unknown`, if it clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_prefered_for_preferred() {
        let valid = &["search_paths", "default_dir", "system_paths", "preferred"];
        assert_eq!(suggest_key("prefered", valid), Some("preferred".to_string()));
    }

    #[test]
    fn suggest_picks_closest_match() {
        let valid = &["search_paths", "system_paths"];
        assert_eq!(
            suggest_key("search_path", valid),
            Some("search_paths".to_string())
        );
    }

    #[test]
    fn unknown_key_names_field_once() {
        let err = crate::load_config_from_str("[plugin]\nprefered = [\"cpu\"]\n").unwrap_err();

        let errors = figment_to_config_errors(err);
        let keys: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::UnknownKey { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["plugin.prefered"]);
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["search_paths", "default_dir", "preferred"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }
}
