//! Search-path variables and the ordered, duplicate-free lists behind them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::core::dependency::{python_site_packages, Dependency};

/// Separator for path lists in the host environment.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// The environment variables a ROS 2 install tree contributes to.
///
/// `PATH` is intentionally absent: packaged dependencies must not shadow
/// the host shell's command resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SearchPathVar {
    #[serde(rename = "AMENT_PREFIX_PATH")]
    AmentPrefixPath,
    #[serde(rename = "CMAKE_PREFIX_PATH")]
    CmakePrefixPath,
    #[serde(rename = "COLCON_PREFIX_PATH")]
    ColconPrefixPath,
    #[serde(rename = "LD_LIBRARY_PATH")]
    LdLibraryPath,
    #[serde(rename = "PKG_CONFIG_PATH")]
    PkgConfigPath,
    #[serde(rename = "PYTHONPATH")]
    PythonPath,
}

impl SearchPathVar {
    /// Every tracked variable.
    pub const ALL: [SearchPathVar; 6] = [
        SearchPathVar::AmentPrefixPath,
        SearchPathVar::CmakePrefixPath,
        SearchPathVar::ColconPrefixPath,
        SearchPathVar::LdLibraryPath,
        SearchPathVar::PkgConfigPath,
        SearchPathVar::PythonPath,
    ];

    /// Variables that receive an install root directly.
    pub const PREFIXES: [SearchPathVar; 3] = [
        SearchPathVar::AmentPrefixPath,
        SearchPathVar::CmakePrefixPath,
        SearchPathVar::ColconPrefixPath,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPathVar::AmentPrefixPath => "AMENT_PREFIX_PATH",
            SearchPathVar::CmakePrefixPath => "CMAKE_PREFIX_PATH",
            SearchPathVar::ColconPrefixPath => "COLCON_PREFIX_PATH",
            SearchPathVar::LdLibraryPath => "LD_LIBRARY_PATH",
            SearchPathVar::PkgConfigPath => "PKG_CONFIG_PATH",
            SearchPathVar::PythonPath => "PYTHONPATH",
        }
    }
}

impl fmt::Display for SearchPathVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchPathVar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchPathVar::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("`{}` is not a tracked search-path variable", s))
    }
}

/// Per-variable ordered path lists.
///
/// This is the explicit stand-in for the process environment: steps read
/// and extend it, and it is only turned into real environment variables on
/// the child process of an external tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchPaths {
    vars: BTreeMap<SearchPathVar, Vec<String>>,
}

impl SearchPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from environment pairs, keeping tracked variables only.
    pub fn from_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut paths = SearchPaths::new();
        for (key, value) in vars {
            let Ok(var) = key.as_ref().parse::<SearchPathVar>() else {
                continue;
            };
            let list = paths.vars.entry(var).or_default();
            for entry in split_path_list(value.as_ref()) {
                if !list.iter().any(|p| p == entry) {
                    list.push(entry.to_string());
                }
            }
        }
        paths
    }

    /// Seed from the current process environment.
    pub fn from_process_env() -> Self {
        Self::from_env(std::env::vars())
    }

    /// Entries for `var`, first entry first.
    pub fn get(&self, var: SearchPathVar) -> &[String] {
        self.vars.get(&var).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.vars.values().all(Vec::is_empty)
    }

    /// Put `entry` at the front of `var` unless it is already listed.
    ///
    /// Returns whether the entry was inserted.
    pub fn prepend(&mut self, var: SearchPathVar, entry: impl Into<String>) -> bool {
        let entry = entry.into();
        let list = self.vars.entry(var).or_default();
        if list.contains(&entry) {
            return false;
        }
        list.insert(0, entry);
        true
    }

    /// Export an install root: prefix variables get the root itself, and
    /// `PYTHONPATH` gets its site-packages directory when that exists.
    pub fn export_root(&mut self, root: &Path, python_version: &str) {
        let root_str = root.to_string_lossy();
        for var in SearchPathVar::PREFIXES {
            self.prepend(var, root_str.as_ref());
        }

        let python_dir = python_site_packages(root, python_version);
        if python_dir.is_dir() {
            self.prepend(SearchPathVar::PythonPath, python_dir.to_string_lossy());
        }
    }

    /// Merge a raw harvested value for `var`.
    ///
    /// Only entries under the dependency's root are kept; entries already
    /// listed are skipped; each new entry goes to the front in turn.
    pub fn merge_harvested(&mut self, var: SearchPathVar, raw: &str, dep: &Dependency) {
        for entry in split_path_list(raw.trim()) {
            if !dep.owns(Path::new(entry)) {
                tracing::trace!("{}: dropping {} (outside {})", var, entry, dep.root.display());
                continue;
            }
            self.prepend(var, entry);
        }
    }

    /// Merge every tracked variable from a harvested environment dump.
    pub fn merge_env<K: AsRef<str>, V: AsRef<str>>(&mut self, pairs: &[(K, V)], dep: &Dependency) {
        for (key, value) in pairs {
            if let Ok(var) = key.as_ref().parse::<SearchPathVar>() {
                self.merge_harvested(var, value.as_ref(), dep);
            }
        }
    }

    /// `var` joined with the host separator, if it has entries.
    pub fn joined(&self, var: SearchPathVar) -> Option<String> {
        let list = self.get(var);
        if list.is_empty() {
            None
        } else {
            Some(list.join(&PATH_LIST_SEPARATOR.to_string()))
        }
    }

    /// Materialize as environment pairs for a child process.
    pub fn to_env(&self) -> Vec<(&'static str, String)> {
        SearchPathVar::ALL
            .into_iter()
            .filter_map(|var| self.joined(var).map(|v| (var.as_str(), v)))
            .collect()
    }

    /// Iterate over non-empty variables in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (SearchPathVar, &[String])> {
        self.vars
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(var, list)| (*var, list.as_slice()))
    }
}

/// Split a host path list, dropping empty entries.
pub fn split_path_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(PATH_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}
