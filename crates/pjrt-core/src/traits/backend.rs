// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Framework-facing backend trait.

use std::any::Any;

use crate::error::PjrtError;

/// A constructed compute backend, as handed to the framework.
///
/// Implementations own their native resources. The framework decides when to
/// call [`Backend::finalize`].
pub trait Backend: Any + Send + Sync {
    /// Registry name of the backend, e.g. `"xla"`.
    fn name(&self) -> &str;

    /// Human-readable description including the selected plugin and platform.
    fn description(&self) -> String;

    /// Releases the native client. Calling it twice is a no-op.
    fn finalize(&mut self) -> Result<(), PjrtError>;

    /// Access to the concrete type, for callers that need backend-specific settings.
    fn as_any(&self) -> &dyn Any;
}
