// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary plugin directories for discovery tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory of fake PJRT plugin libraries, removed on drop.
///
/// Fixture helpers panic on I/O failure.
pub struct PluginDir {
    dir: TempDir,
}

impl PluginDir {
    /// Create an empty plugin directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temporary plugin directory"),
        }
    }

    /// Create a directory holding a plugin file for each name.
    pub fn with_plugins(names: &[&str]) -> Self {
        let dir = Self::new();
        for name in names {
            dir.add_plugin(name);
        }
        dir
    }

    /// Library file name the scanner recognizes for `name`.
    pub fn plugin_file_name(name: &str) -> String {
        format!("pjrt_c_api_{name}_plugin.so")
    }

    /// Add a plugin file and return its path.
    pub fn add_plugin(&self, name: &str) -> PathBuf {
        self.add_file(&Self::plugin_file_name(name))
    }

    /// Remove a plugin file added earlier.
    pub fn remove_plugin(&self, name: &str) {
        fs::remove_file(self.path().join(Self::plugin_file_name(name)))
            .expect("remove plugin file");
    }

    /// Add an arbitrary empty file and return its path.
    pub fn add_file(&self, file_name: &str) -> PathBuf {
        let path = self.path().join(file_name);
        fs::write(&path, b"").expect("write plugin file");
        path
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for PluginDir {
    fn default() -> Self {
        Self::new()
    }
}
