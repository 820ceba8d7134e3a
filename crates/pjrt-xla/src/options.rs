// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of the backend configuration string `<plugin>[,<option>]*`.

use std::fmt;

/// Option token that asks for quiet graph compilation.
pub const SUPPRESS_LOGGING_OPTION: &str = "supress_logging";

/// A parsed backend configuration string.
///
/// `"cuda,supress_logging"` selects the `cuda` plugin with one option token;
/// `""` selects the default plugin with no options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendConfig {
    /// Requested plugin; empty means "first available".
    pub plugin_name: String,
    /// Option tokens in the order given, never empty strings.
    pub options: Vec<String>,
}

impl BackendConfig {
    /// Split `config` on commas: the first segment names the plugin, the
    /// rest are option tokens. Empty tokens (`"cpu,,x,"`) are dropped.
    pub fn parse(config: &str) -> Self {
        let mut parts = config.split(',');
        let plugin_name = parts.next().unwrap_or_default().to_string();
        let options = parts
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            plugin_name,
            options,
        }
    }

    /// Whether `token` was given as an option.
    pub fn has_option(&self, token: &str) -> bool {
        self.options.iter().any(|o| o == token)
    }
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plugin_name)?;
        for option in &self.options {
            write!(f, ",{option}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plugin_only() {
        let config = BackendConfig::parse("cuda");
        assert_eq!(config.plugin_name, "cuda");
        assert!(config.options.is_empty());
    }

    #[test]
    fn empty_string_means_default_plugin() {
        assert_eq!(BackendConfig::parse(""), BackendConfig::default());
    }

    #[test]
    fn options_follow_plugin_name() {
        let config = BackendConfig::parse("cpu,supress_logging,fast");
        assert_eq!(config.plugin_name, "cpu");
        assert_eq!(config.options, vec!["supress_logging", "fast"]);
        assert!(config.has_option(SUPPRESS_LOGGING_OPTION));
        assert!(!config.has_option("slow"));
    }

    #[test]
    fn doubled_and_trailing_commas_are_dropped() {
        let config = BackendConfig::parse("cpu,,a,,b,");
        assert_eq!(config.options, vec!["a", "b"]);
    }

    #[test]
    fn options_without_plugin_name() {
        let config = BackendConfig::parse(",supress_logging");
        assert_eq!(config.plugin_name, "");
        assert_eq!(config.options, vec!["supress_logging"]);
    }

    #[test]
    fn display_reassembles_normalized_form() {
        assert_eq!(BackendConfig::parse("cpu,,a,").to_string(), "cpu,a");
    }

    proptest! {
        #[test]
        fn parse_never_yields_empty_tokens(s in "[a-z_,]{0,24}") {
            let config = BackendConfig::parse(&s);
            prop_assert!(config.options.iter().all(|o| !o.is_empty()));
        }

        #[test]
        fn plugin_name_is_text_before_first_comma(s in ".{0,24}") {
            let config = BackendConfig::parse(&s);
            let expected = s.split(',').next().unwrap_or_default();
            prop_assert_eq!(config.plugin_name.as_str(), expected);
            prop_assert!(!config.plugin_name.contains(','));
        }
    }
}
