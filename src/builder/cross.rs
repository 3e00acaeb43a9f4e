//! Cross-compilation support.
//!
//! When cross building, colcon's CMake invocations get a toolchain file,
//! and that toolchain file learns where the ROS 2 workspaces live through
//! an environment variable holding a CMake (`;`-separated) list.

use std::path::{Path, PathBuf};

use crate::env::search_paths::{SearchPathVar, SearchPaths};

/// Variable the toolchain file reads the workspace list from.
pub const DEFAULT_WORKSPACE_VAR: &str = "ROS2_CONAN_WORKSPACE";

/// A CMake toolchain file plus the variable it reads workspace roots from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossToolchain {
    toolchain_file: PathBuf,
    workspace_var: String,
}

impl CrossToolchain {
    pub fn new(toolchain_file: impl Into<PathBuf>) -> Self {
        CrossToolchain {
            toolchain_file: toolchain_file.into(),
            workspace_var: DEFAULT_WORKSPACE_VAR.to_string(),
        }
    }

    pub fn with_workspace_var(mut self, var: impl Into<String>) -> Self {
        self.workspace_var = var.into();
        self
    }

    pub fn toolchain_file(&self) -> &Path {
        &self.toolchain_file
    }

    pub fn workspace_var(&self) -> &str {
        &self.workspace_var
    }

    /// The `-DCMAKE_TOOLCHAIN_FILE=` argument for colcon's CMake args.
    pub fn cmake_arg(&self) -> String {
        format!("-DCMAKE_TOOLCHAIN_FILE={}", self.toolchain_file.display())
    }

    /// Environment entry advertising the workspace roots to the toolchain.
    ///
    /// The workspace being built comes first, followed by every
    /// `AMENT_PREFIX_PATH` entry known so far.
    pub fn workspace_env(&self, workspace_root: &Path, paths: &SearchPaths) -> (String, String) {
        let mut roots = vec![workspace_root.to_string_lossy().into_owned()];
        for entry in paths.get(SearchPathVar::AmentPrefixPath) {
            if !roots.contains(entry) {
                roots.push(entry.clone());
            }
        }
        (self.workspace_var.clone(), cmake_list(&roots))
    }
}

/// Join entries as a CMake list.
///
/// The entries come from host path lists (`:` on Unix), but CMake lists
/// always use `;`.
pub fn cmake_list<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(";")
}
