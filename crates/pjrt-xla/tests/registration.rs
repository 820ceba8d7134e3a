// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end: discovery over a plugin directory, registration, and
//! construction through a framework registry.

use std::ffi::OsString;
use std::sync::Arc;

use pjrt_config::PluginConfig;
use pjrt_core::{BackendRegistry, ClientOptions, PjrtError, PluginResolutionError};
use pjrt_test_utils::{MockRuntime, PluginDir};
use pjrt_xla::scanner::resolve_search_paths;
use pjrt_xla::{PluginCatalog, PluginScanner, XlaBackend};

fn leaked_catalog(dir: &PluginDir) -> &'static PluginCatalog {
    let config = PluginConfig::default();
    let paths = resolve_search_paths(&config, Some(OsString::from(dir.path())));
    Box::leak(Box::new(PluginCatalog::new(
        PluginScanner::new(paths),
        config.preferred,
    )))
}

#[test]
fn env_override_points_discovery_at_one_directory() {
    let dir = PluginDir::with_plugins(&["tpu", "cpu"]);
    dir.add_file("libunrelated.so");
    dir.add_file("pjrt_c_api_cuda_plugin.txt");

    let catalog = leaked_catalog(&dir);
    assert_eq!(catalog.list_available(), ["cpu", "tpu"]);
}

#[test]
fn registered_constructor_builds_backend_from_backend_string() {
    let dir = PluginDir::with_plugins(&["cpu", "cuda"]);
    let registry = BackendRegistry::new();
    let runtime = Arc::new(MockRuntime::new());

    assert!(!pjrt_xla::register_with(
        &registry,
        leaked_catalog(&dir),
        runtime.clone()
    ));
    assert!(registry.contains("xla"));

    let backend = registry
        .new_backend("xla:cpu,supress_logging", "xla", &ClientOptions::new())
        .unwrap();
    assert_eq!(backend.name(), "xla");

    let xla = backend
        .as_any()
        .downcast_ref::<XlaBackend>()
        .expect("xla backend");
    assert_eq!(xla.plugin_name(), "cpu");
    assert!(xla.suppress_logging());
    assert_eq!(runtime.loaded_plugins(), vec!["cpu".to_string()]);
}

#[test]
fn default_backend_with_empty_config_selects_preferred_plugin() {
    let dir = PluginDir::with_plugins(&["tpu", "cuda", "cpu"]);
    let registry = BackendRegistry::new();
    pjrt_xla::register_with(&registry, leaked_catalog(&dir), Arc::new(MockRuntime::new()));

    let mut backend = registry
        .new_backend("", "xla", &ClientOptions::new())
        .unwrap();
    let xla = backend
        .as_any()
        .downcast_ref::<XlaBackend>()
        .expect("xla backend");
    assert_eq!(xla.plugin_name(), "cuda");
    assert!(xla.suppress_logging());

    backend.finalize().unwrap();
    assert!(backend.description().ends_with("(finalized)"));
}

#[test]
fn resolution_errors_surface_through_the_registry() {
    let dir = PluginDir::with_plugins(&["cpu"]);
    let registry = BackendRegistry::new();
    pjrt_xla::register_with(&registry, leaked_catalog(&dir), Arc::new(MockRuntime::new()));

    let err = registry
        .new_backend("xla:rocm", "xla", &ClientOptions::new())
        .err()
        .expect("unknown plugin");
    match err {
        PjrtError::Resolution(PluginResolutionError::PluginNotFound {
            requested,
            available,
            ..
        }) => {
            assert_eq!(requested, "rocm");
            assert_eq!(available, vec!["cpu".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn re_registration_replaces_constructor() {
    let first = PluginDir::with_plugins(&["cpu"]);
    let second = PluginDir::with_plugins(&["tpu"]);
    let registry = BackendRegistry::new();

    pjrt_xla::register_with(&registry, leaked_catalog(&first), Arc::new(MockRuntime::new()));
    assert!(pjrt_xla::register_with(
        &registry,
        leaked_catalog(&second),
        Arc::new(MockRuntime::new())
    ));
    assert_eq!(registry.len(), 1);

    let backend = registry
        .new_backend("xla", "xla", &ClientOptions::new())
        .unwrap();
    let xla = backend
        .as_any()
        .downcast_ref::<XlaBackend>()
        .expect("xla backend");
    assert_eq!(xla.plugin_name(), "tpu");
}

#[cfg(feature = "dylib")]
#[test]
fn library_loader_reports_unloadable_plugin_as_lookup_failure() {
    use pjrt_xla::{ClientFactory, DylibRuntime};

    let dir = PluginDir::with_plugins(&["cpu"]);
    let runtime = DylibRuntime::new();

    let err = ClientFactory::new(leaked_catalog(&dir), &runtime)
        .build_from_config("cpu", &ClientOptions::new())
        .unwrap_err();
    match err {
        PluginResolutionError::PluginLookupFailed { backend, plugin, source } => {
            assert_eq!(backend, "xla");
            assert_eq!(plugin, "cpu");
            assert!(source.to_string().contains("cannot load PJRT plugin library"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
