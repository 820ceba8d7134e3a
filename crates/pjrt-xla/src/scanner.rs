// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem discovery of PJRT plugin libraries.
//!
//! A plugin is a shared library named `pjrt_c_api_<name>_plugin.<ext>`.
//! Directories are searched in priority order; when the same plugin shows up
//! in several directories every location is kept, highest priority first.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pjrt_config::PluginConfig;
use pjrt_core::PluginDescriptor;
use regex::Regex;
use tracing::debug;

/// Environment variable holding the plugin search path list.
pub const PLUGIN_PATH_ENV: &str = "PJRT_PLUGIN_LIBRARY_PATH";

/// System-wide dynamic linker configuration.
const LD_SO_CONF: &str = "/etc/ld.so.conf";

/// Nested `include` directives followed in `ld.so.conf` before giving up.
const MAX_INCLUDE_DEPTH: usize = 8;

static PLUGIN_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pjrt_c_api_([A-Za-z0-9_]+?)_plugin\.(?:so|dylib|dll)$")
        .expect("plugin file pattern is valid")
});

/// Extract the plugin name from a library file name.
///
/// `pjrt_c_api_cuda_plugin.so` yields `cuda`. Names are lowercased.
pub fn plugin_name(file_name: &str) -> Option<String> {
    PLUGIN_FILE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Scans a fixed list of directories for PJRT plugins.
#[derive(Debug, Clone)]
pub struct PluginScanner {
    search_paths: Vec<PathBuf>,
}

impl PluginScanner {
    /// Scanner over `search_paths`, in priority order. Duplicates are dropped.
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths: dedup_paths(search_paths),
        }
    }

    /// Scanner over the directories selected by `config` and the environment.
    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(resolve_search_paths(
            config,
            std::env::var_os(PLUGIN_PATH_ENV),
        ))
    }

    /// Directories searched, highest priority first.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find every plugin in the search path.
    ///
    /// Unreadable or missing directories are skipped. An empty map is a valid
    /// answer, not an error.
    pub fn discover(&self) -> BTreeMap<String, PluginDescriptor> {
        let mut found: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

        for dir in &self.search_paths {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "skipping plugin directory");
                    continue;
                }
            };

            let mut files: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .collect();
            files.sort();

            for path in files {
                let Some(name) = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(plugin_name)
                else {
                    continue;
                };
                if !path.is_file() {
                    continue;
                }
                debug!(plugin = %name, path = %path.display(), "found PJRT plugin");
                found.entry(name).or_default().push(path);
            }
        }

        found
            .into_iter()
            .map(|(name, paths)| {
                let descriptor = PluginDescriptor::new(name.clone(), paths);
                (name, descriptor)
            })
            .collect()
    }
}

/// Pick the directories to search.
///
/// 1. `env_override` (the value of `PJRT_PLUGIN_LIBRARY_PATH`), if non-empty.
/// 2. `config.search_paths`, if non-empty.
/// 3. `config.default_dir`, then the system library locations when
///    `config.system_paths` is set.
pub fn resolve_search_paths(config: &PluginConfig, env_override: Option<OsString>) -> Vec<PathBuf> {
    if let Some(value) = env_override.filter(|v| !v.is_empty()) {
        let paths: Vec<PathBuf> = std::env::split_paths(&value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        if !paths.is_empty() {
            return dedup_paths(paths);
        }
        debug!(
            var = PLUGIN_PATH_ENV,
            value = ?value,
            "plugin path override names no directories, using configured search paths"
        );
    }

    if !config.search_paths.is_empty() {
        return dedup_paths(config.search_paths.clone());
    }

    let mut paths = vec![config.default_dir.clone()];
    if config.system_paths {
        paths.extend(system_library_paths());
    }
    dedup_paths(paths)
}

/// Standard shared-library locations of the platform, in linker order.
pub fn system_library_paths() -> Vec<PathBuf> {
    let var = if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else {
        "LD_LIBRARY_PATH"
    };

    let mut paths: Vec<PathBuf> = std::env::var_os(var)
        .map(|value| {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();

    if cfg!(target_os = "linux") {
        paths.extend(parse_ld_so_conf(Path::new(LD_SO_CONF)));
    }

    paths.push(PathBuf::from("/usr/local/lib"));
    paths.push(PathBuf::from("/usr/lib"));
    paths
}

/// Directories listed in an `ld.so.conf`-style file.
///
/// Follows `include` directives, whose file-name component may use `*` and
/// `?` wildcards; included files are read in sorted order. Relative include
/// patterns are resolved against the including file's directory. A missing
/// file yields no directories.
pub fn parse_ld_so_conf(path: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    read_ld_so_conf(path, 0, &mut dirs);
    dirs
}

fn read_ld_so_conf(path: &Path, depth: usize, dirs: &mut Vec<PathBuf>) {
    if depth > MAX_INCLUDE_DEPTH {
        debug!(path = %path.display(), "ld.so.conf include depth exceeded");
        return;
    }
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let base = path.parent().unwrap_or_else(|| Path::new("/"));

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() || line.starts_with("hwcap ") {
            continue;
        }
        if let Some(pattern) = line.strip_prefix("include") {
            if !pattern.starts_with(char::is_whitespace) {
                continue;
            }
            for pattern in pattern.split_whitespace() {
                for included in expand_include(base, pattern) {
                    read_ld_so_conf(&included, depth + 1, dirs);
                }
            }
            continue;
        }
        dirs.extend(
            line.split(|c: char| c.is_whitespace() || c == ':' || c == ',')
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        );
    }
}

/// Expand an include pattern such as `ld.so.conf.d/*.conf` into sorted paths.
fn expand_include(base: &Path, pattern: &str) -> Vec<PathBuf> {
    let pattern = base.join(pattern);
    let (Some(dir), Some(file_pattern)) = (
        pattern.parent(),
        pattern.file_name().and_then(|n| n.to_str()),
    ) else {
        return Vec::new();
    };

    if !file_pattern.contains(['*', '?']) {
        return vec![pattern.clone()];
    }

    let glob = format!(
        "^{}$",
        regex::escape(file_pattern)
            .replace(r"\*", ".*")
            .replace(r"\?", ".")
    );
    let Ok(glob) = Regex::new(&glob) else {
        return Vec::new();
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut matches: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| glob.is_match(n))
        })
        .collect();
    matches.sort();
    matches
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
