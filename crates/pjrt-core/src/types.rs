// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the runtime traits and backend implementations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use strum::IntoStaticStr;

/// A discovered PJRT plugin: its name and every location it was found at.
///
/// Locations are kept in search-path priority order, so the first one is the
/// library that gets loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    name: String,
    paths: Vec<PathBuf>,
}

impl PluginDescriptor {
    /// Create a descriptor from a name and its locations in priority order.
    pub fn new(name: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            paths,
        }
    }

    /// Plugin name, e.g. `"cpu"` or `"cuda"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All locations, highest priority first.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The location that takes precedence.
    pub fn primary_path(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }
}

/// A typed value passed to the PJRT client at creation time.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum NamedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    IntList(Vec<i64>),
}

impl NamedValue {
    /// Short type name used in logs (`bool`, `int`, `float`, `str`, `int_list`).
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<bool> for NamedValue {
    fn from(v: bool) -> Self {
        NamedValue::Bool(v)
    }
}

impl From<i64> for NamedValue {
    fn from(v: i64) -> Self {
        NamedValue::Int(v)
    }
}

impl From<f64> for NamedValue {
    fn from(v: f64) -> Self {
        NamedValue::Float(v)
    }
}

impl From<&str> for NamedValue {
    fn from(v: &str) -> Self {
        NamedValue::Str(v.to_string())
    }
}

impl From<String> for NamedValue {
    fn from(v: String) -> Self {
        NamedValue::Str(v)
    }
}

impl From<Vec<i64>> for NamedValue {
    fn from(v: Vec<i64>) -> Self {
        NamedValue::IntList(v)
    }
}

/// Options handed opaquely to the plugin when a client is created.
///
/// Keys are plugin-defined; this crate never interprets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOptions(BTreeMap<String, NamedValue>);

impl ClientOptions {
    /// Create an empty option map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<NamedValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an option, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<NamedValue>,
    ) -> Option<NamedValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Look up an option by name.
    pub fn get(&self, name: &str) -> Option<&NamedValue> {
        self.0.get(name)
    }

    /// Iterate options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of options.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no options are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<NamedValue>> FromIterator<(K, V)> for ClientOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
