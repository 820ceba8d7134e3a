// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-keyed registry of backend constructors.
//!
//! Backends register a constructor under a fixed name; the framework looks the
//! name up and hands the constructor a configuration string. A backend string
//! has the form `<backend>[:<config>]`, e.g. `xla:cuda,supress_logging`.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::error::PjrtError;
use crate::traits::Backend;
use crate::types::ClientOptions;

/// Constructor stored in the registry.
///
/// Receives the backend-specific configuration string and the options map
/// supplied by the caller of [`BackendRegistry::new_backend`].
pub type BackendConstructor =
    Arc<dyn Fn(&str, &ClientOptions) -> Result<Box<dyn Backend>, PjrtError> + Send + Sync>;

/// Registry of backend constructors keyed by backend name.
///
/// Registration is last-write-wins. Lookups clone the constructor out of the
/// lock, so constructors may themselves use the registry.
pub struct BackendRegistry {
    constructors: RwLock<BTreeMap<String, BackendConstructor>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register `constructor` under `name`, replacing any previous entry.
    ///
    /// Returns true if an existing constructor was replaced.
    pub fn register(&self, name: impl Into<String>, constructor: BackendConstructor) -> bool {
        let name = name.into();
        let mut constructors = self
            .constructors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let replaced = constructors.insert(name.clone(), constructor).is_some();
        if replaced {
            warn!(backend = %name, "backend constructor replaced");
        } else {
            info!(backend = %name, "backend registered");
        }
        replaced
    }

    /// Returns true if a backend is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered backend names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Construct the backend registered under `name` with `config`.
    pub fn construct(
        &self,
        name: &str,
        config: &str,
        options: &ClientOptions,
    ) -> Result<Box<dyn Backend>, PjrtError> {
        let constructor = self
            .constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        match constructor {
            Some(constructor) => constructor(config, options),
            None => Err(PjrtError::BackendNotFound {
                name: name.to_string(),
                available: self.names(),
            }),
        }
    }

    /// Construct a backend from a `<backend>[:<config>]` string.
    ///
    /// An empty backend name selects `default_backend`.
    pub fn new_backend(
        &self,
        backend: &str,
        default_backend: &str,
        options: &ClientOptions,
    ) -> Result<Box<dyn Backend>, PjrtError> {
        let (name, config) = split_backend_string(backend);
        let name = if name.is_empty() { default_backend } else { name };
        self.construct(name, config, options)
    }

    /// Returns the number of registered backends.
    pub fn len(&self) -> usize {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no backends are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}

/// Split `<backend>[:<config>]` into its backend name and configuration.
///
/// Only the first `:` separates, so configurations may contain colons.
pub fn split_backend_string(backend: &str) -> (&str, &str) {
    match backend.split_once(':') {
        Some((name, config)) => (name.trim(), config),
        None => (backend.trim(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::any::Any;
    use tracing_test::traced_test;

    struct NamedBackend {
        name: String,
        config: String,
    }

    impl Backend for NamedBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> String {
            format!("{}:{}", self.name, self.config)
        }

        fn finalize(&mut self) -> Result<(), PjrtError> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn constructor(name: &'static str) -> BackendConstructor {
        Arc::new(move |config: &str, _options: &ClientOptions| -> Result<Box<dyn Backend>, PjrtError> {
            Ok(Box::new(NamedBackend {
                name: name.to_string(),
                config: config.to_string(),
            }) as Box<dyn Backend>)
        })
    }

    #[test]
    fn register_and_construct_roundtrip() {
        let registry = BackendRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.register("xla", constructor("xla")));

        assert!(registry.contains("xla"));
        assert_eq!(registry.len(), 1);

        let backend = registry
            .construct("xla", "cuda", &ClientOptions::new())
            .unwrap();
        assert_eq!(backend.description(), "xla:cuda");
    }

    #[test]
    #[traced_test]
    fn re_registration_is_last_write_wins() {
        let registry = BackendRegistry::new();
        registry.register("xla", constructor("first"));
        assert!(registry.register("xla", constructor("second")));

        let backend = registry.construct("xla", "", &ClientOptions::new()).unwrap();
        assert_eq!(backend.name(), "second");
        assert_eq!(registry.len(), 1);
        assert!(logs_contain("backend constructor replaced"));
    }

    #[test]
    fn unknown_backend_lists_registered_names() {
        let registry = BackendRegistry::new();
        registry.register("xla", constructor("xla"));
        registry.register("simplego", constructor("simplego"));

        let err = registry
            .construct("onnx", "", &ClientOptions::new())
            .err()
            .expect("onnx is not registered");
        match err {
            PjrtError::BackendNotFound { name, available } => {
                assert_eq!(name, "onnx");
                assert_eq!(available, vec!["simplego".to_string(), "xla".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn new_backend_splits_name_and_config() {
        let registry = BackendRegistry::new();
        registry.register("xla", constructor("xla"));

        let backend = registry
            .new_backend("xla:cpu,supress_logging", "other", &ClientOptions::new())
            .unwrap();
        assert_eq!(backend.description(), "xla:cpu,supress_logging");
    }

    #[test]
    fn new_backend_empty_name_uses_default() {
        let registry = BackendRegistry::new();
        registry.register("xla", constructor("xla"));

        let backend = registry.new_backend("", "xla", &ClientOptions::new()).unwrap();
        assert_eq!(backend.name(), "xla");

        let backend = registry.new_backend(":cuda", "xla", &ClientOptions::new()).unwrap();
        assert_eq!(backend.description(), "xla:cuda");
    }

    #[test]
    fn split_backend_string_variants() {
        assert_eq!(split_backend_string("xla"), ("xla", ""));
        assert_eq!(split_backend_string("xla:cuda"), ("xla", "cuda"));
        assert_eq!(split_backend_string("xla:/opt/a:b"), ("xla", "/opt/a:b"));
        assert_eq!(split_backend_string(""), ("", ""));
    }

    #[test]
    fn constructor_may_reenter_registry() {
        let registry = Arc::new(BackendRegistry::new());
        registry.register("inner", constructor("inner"));
        let weak = Arc::downgrade(&registry);
        registry.register(
            "outer",
            Arc::new(move |config: &str, options: &ClientOptions| -> Result<Box<dyn Backend>, PjrtError> {
                let registry = weak
                    .upgrade()
                    .ok_or_else(|| PjrtError::runtime("registry dropped"))?;
                registry.construct("inner", config, options)
            }),
        );

        let backend = registry.construct("outer", "x", &ClientOptions::new()).unwrap();
        assert_eq!(backend.name(), "inner");
    }

    proptest! {
        #[test]
        fn split_keeps_everything_after_first_colon(name in "[a-z]{0,8}", config in ".{0,16}") {
            let joined = format!("{name}:{config}");
            let (n, c) = split_backend_string(&joined);
            prop_assert_eq!(n, name.as_str());
            prop_assert_eq!(c, config.as_str());
        }
    }
}
