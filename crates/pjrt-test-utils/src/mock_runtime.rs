// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock PJRT runtime for deterministic testing.
//!
//! `MockRuntime` loads any discovered plugin without touching the library,
//! records every call, and can be scripted to fail plugin lookup or client
//! creation for specific plugin names.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pjrt_core::{
    Client, ClientOptions, DiagnosticsGuard, PjrtError, Plugin, PluginDescriptor, PluginRuntime,
};
use tracing::debug;

/// Calls observed by a [`MockRuntime`] and everything it created.
#[derive(Default)]
struct Recorder {
    loaded: Mutex<Vec<String>>,
    quiet_clients: Mutex<Vec<String>>,
    last_options: Mutex<Option<ClientOptions>>,
    suppressed: AtomicBool,
    suppressions_entered: AtomicUsize,
    suppressions_released: AtomicUsize,
    clients_destroyed: AtomicUsize,
}

/// A runtime that never loads a native library.
#[derive(Default)]
pub struct MockRuntime {
    fail_lookup: HashSet<String>,
    fail_client: HashSet<String>,
    recorder: Arc<Recorder>,
}

impl MockRuntime {
    /// Create a runtime where every plugin loads and every client opens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `load_plugin` fail for `name`.
    pub fn fail_lookup(mut self, name: &str) -> Self {
        self.fail_lookup.insert(name.to_string());
        self
    }

    /// Make client creation fail for `name`.
    pub fn fail_client(mut self, name: &str) -> Self {
        self.fail_client.insert(name.to_string());
        self
    }

    /// Names of plugins loaded so far, in call order.
    pub fn loaded_plugins(&self) -> Vec<String> {
        self.recorder
            .loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Plugins whose client was created while diagnostics were suppressed.
    pub fn quiet_clients(&self) -> Vec<String> {
        self.recorder
            .quiet_clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Options passed to the most recent client creation.
    pub fn last_client_options(&self) -> Option<ClientOptions> {
        self.recorder
            .last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times diagnostics suppression was entered.
    pub fn suppressions_entered(&self) -> usize {
        self.recorder.suppressions_entered.load(Ordering::SeqCst)
    }

    /// Number of times diagnostics suppression was released.
    pub fn suppressions_released(&self) -> usize {
        self.recorder.suppressions_released.load(Ordering::SeqCst)
    }

    /// Number of clients destroyed.
    pub fn clients_destroyed(&self) -> usize {
        self.recorder.clients_destroyed.load(Ordering::SeqCst)
    }
}

impl PluginRuntime for MockRuntime {
    fn load_plugin(&self, descriptor: &PluginDescriptor) -> Result<Arc<dyn Plugin>, PjrtError> {
        let name = descriptor.name();
        if self.fail_lookup.contains(name) {
            return Err(PjrtError::runtime(format!(
                "mock: cannot load plugin {name}"
            )));
        }
        let path = descriptor
            .primary_path()
            .ok_or_else(|| PjrtError::runtime(format!("mock: plugin {name} has no location")))?
            .to_path_buf();

        debug!(plugin = %name, path = %path.display(), "mock plugin loaded");
        self.recorder
            .loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());

        Ok(Arc::new(MockPlugin {
            name: name.to_string(),
            path,
            fail_client: self.fail_client.contains(name),
            recorder: Arc::clone(&self.recorder),
        }))
    }

    fn suppress_diagnostics(&self) -> DiagnosticsGuard {
        self.recorder
            .suppressions_entered
            .fetch_add(1, Ordering::SeqCst);
        self.recorder.suppressed.store(true, Ordering::SeqCst);

        let recorder = Arc::clone(&self.recorder);
        DiagnosticsGuard::new(move || {
            recorder.suppressed.store(false, Ordering::SeqCst);
            recorder.suppressions_released.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// A plugin handed out by [`MockRuntime`].
pub struct MockPlugin {
    name: String,
    path: PathBuf,
    fail_client: bool,
    recorder: Arc<Recorder>,
}

impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn create_client(&self, options: &ClientOptions) -> Result<Box<dyn Client>, PjrtError> {
        *self
            .recorder
            .last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(options.clone());

        if self.recorder.suppressed.load(Ordering::SeqCst) {
            self.recorder
                .quiet_clients
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(self.name.clone());
        }

        if self.fail_client {
            return Err(PjrtError::runtime(format!(
                "mock: client creation failed for plugin {}",
                self.name
            )));
        }

        Ok(Box::new(MockClient {
            platform: self.name.clone(),
            destroyed: false,
            recorder: Arc::clone(&self.recorder),
        }))
    }
}

/// A client handed out by [`MockPlugin`]. Reports a single device.
pub struct MockClient {
    platform: String,
    destroyed: bool,
    recorder: Arc<Recorder>,
}

impl Client for MockClient {
    fn platform_name(&self) -> String {
        self.platform.clone()
    }

    fn platform_version(&self) -> String {
        "mock-0.1.0".to_string()
    }

    fn device_count(&self) -> usize {
        1
    }

    fn destroy(&mut self) -> Result<(), PjrtError> {
        if !self.destroyed {
            self.destroyed = true;
            self.recorder.clients_destroyed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> PluginDescriptor {
        PluginDescriptor::new(name, vec![PathBuf::from(format!("/fake/{name}.so"))])
    }

    #[test]
    fn loads_and_records_plugins() {
        let runtime = MockRuntime::new();
        let plugin = runtime.load_plugin(&descriptor("cpu")).unwrap();
        assert_eq!(plugin.name(), "cpu");
        assert_eq!(plugin.path(), Path::new("/fake/cpu.so"));
        assert_eq!(runtime.loaded_plugins(), vec!["cpu".to_string()]);
    }

    #[test]
    fn scripted_failures() {
        let runtime = MockRuntime::new().fail_lookup("cuda").fail_client("cpu");
        assert!(runtime.load_plugin(&descriptor("cuda")).is_err());

        let plugin = runtime.load_plugin(&descriptor("cpu")).unwrap();
        assert!(plugin.create_client(&ClientOptions::new()).is_err());
    }

    #[test]
    fn descriptor_without_location_fails() {
        let runtime = MockRuntime::new();
        let err = runtime
            .load_plugin(&PluginDescriptor::new("cpu", vec![]))
            .err()
            .expect("no location");
        assert!(err.to_string().contains("no location"));
    }

    #[test]
    fn suppression_is_observed_by_clients() {
        let runtime = MockRuntime::new();
        let plugin = runtime.load_plugin(&descriptor("cpu")).unwrap();

        {
            let _guard = runtime.suppress_diagnostics();
            plugin.create_client(&ClientOptions::new()).unwrap();
        }
        plugin.create_client(&ClientOptions::new()).unwrap();

        assert_eq!(runtime.quiet_clients(), vec!["cpu".to_string()]);
        assert_eq!(runtime.suppressions_entered(), 1);
        assert_eq!(runtime.suppressions_released(), 1);
    }
}
