// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits implemented by the native PJRT bindings.
//!
//! The runtime turns a discovered [`PluginDescriptor`] into a loaded
//! [`Plugin`], which in turn creates [`Client`] sessions.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::PjrtError;
use crate::types::{ClientOptions, PluginDescriptor};

/// Entry point into the native PJRT runtime.
pub trait PluginRuntime: Send + Sync {
    /// Load (or fetch the already loaded) plugin described by `descriptor`.
    fn load_plugin(&self, descriptor: &PluginDescriptor) -> Result<Arc<dyn Plugin>, PjrtError>;

    /// Silence the runtime's process-wide diagnostic logging until the guard drops.
    ///
    /// The scope is global to the process: two threads must not hold guards at
    /// the same time. Runtimes without noisy logging keep the default.
    fn suppress_diagnostics(&self) -> DiagnosticsGuard {
        DiagnosticsGuard::inactive()
    }
}

/// A loaded PJRT plugin library.
pub trait Plugin: Send + Sync {
    /// Plugin name, e.g. `"cpu"`.
    fn name(&self) -> &str;

    /// Library the plugin was loaded from.
    fn path(&self) -> &Path;

    /// Open a new client session against the plugin.
    fn create_client(&self, options: &ClientOptions) -> Result<Box<dyn Client>, PjrtError>;
}

/// A live client session on a PJRT plugin.
pub trait Client: Send + Sync {
    /// Platform reported by the plugin, e.g. `"cpu"` or `"cuda"`.
    fn platform_name(&self) -> String;

    /// Platform version string reported by the plugin.
    fn platform_version(&self) -> String;

    /// Number of addressable devices.
    fn device_count(&self) -> usize;

    /// Destroy the native client. Further calls are no-ops.
    fn destroy(&mut self) -> Result<(), PjrtError>;
}

/// Scope of suppressed runtime diagnostics. Logging is restored on drop.
#[must_use = "diagnostics are restored as soon as the guard is dropped"]
pub struct DiagnosticsGuard {
    restore: Option<Box<dyn FnOnce() + Send>>,
}

impl DiagnosticsGuard {
    /// A guard that restores logging by running `restore` on drop.
    pub fn new(restore: impl FnOnce() + Send + 'static) -> Self {
        Self {
            restore: Some(Box::new(restore)),
        }
    }

    /// A guard that suppresses nothing.
    pub fn inactive() -> Self {
        Self { restore: None }
    }

    /// Whether dropping this guard restores anything.
    pub fn is_active(&self) -> bool {
        self.restore.is_some()
    }
}

impl Drop for DiagnosticsGuard {
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

impl fmt::Debug for DiagnosticsGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsGuard")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn guard_restores_exactly_once_on_drop() {
        let restored = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&restored);
        let guard = DiagnosticsGuard::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(guard.is_active());
        assert_eq!(restored.load(Ordering::SeqCst), 0);

        drop(guard);
        assert_eq!(restored.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn inactive_guard_does_nothing() {
        let guard = DiagnosticsGuard::inactive();
        assert!(!guard.is_active());
        assert!(format!("{guard:?}").contains("active: false"));
    }
}
