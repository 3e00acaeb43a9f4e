//! Configuration file support for rosdock.
//!
//! rosdock supports two configuration file locations:
//! - Global: `<config dir>/rosdock/config.toml` - User-wide defaults
//! - Project: `.rosdock/config.toml` next to the recipe - Project overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::cross::DEFAULT_WORKSPACE_VAR;
use crate::core::workspace::DEFAULT_WORKSPACE_DIR;
use crate::env::activate::DEFAULT_ENV_NAME;

/// Default directory the packaged install tree is copied into.
pub const DEFAULT_PACKAGE_DIR: &str = "package";

/// rosdock configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// Paths or names of the external tools rosdock drives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub vcs: Option<PathBuf>,
    pub colcon: Option<PathBuf>,
    pub bash: Option<PathBuf>,
    pub python: Option<PathBuf>,
}

impl ToolsConfig {
    pub fn vcs(&self) -> PathBuf {
        self.vcs.clone().unwrap_or_else(|| PathBuf::from("vcs"))
    }

    pub fn colcon(&self) -> PathBuf {
        self.colcon.clone().unwrap_or_else(|| PathBuf::from("colcon"))
    }

    pub fn bash(&self) -> PathBuf {
        self.bash.clone().unwrap_or_else(|| PathBuf::from("bash"))
    }

    pub fn python(&self) -> PathBuf {
        self.python.clone().unwrap_or_else(|| PathBuf::from("python3"))
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Workspace directory, relative to the recipe (default `_ws`)
    pub workspace_dir: Option<PathBuf>,

    /// Package output directory, relative to the recipe (default `package`)
    pub package_dir: Option<PathBuf>,

    /// CMake toolchain file; setting it enables cross-compilation
    pub toolchain_file: Option<PathBuf>,

    /// Variable the toolchain file reads workspace roots from
    pub toolchain_workspace_var: Option<String>,

    /// Prompt tag used by the activation script
    pub env_name: Option<String>,
}

impl BuildConfig {
    pub fn workspace_dir(&self) -> PathBuf {
        self.workspace_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_DIR))
    }

    pub fn package_dir(&self) -> PathBuf {
        self.package_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_DIR))
    }

    pub fn toolchain_workspace_var(&self) -> &str {
        self.toolchain_workspace_var
            .as_deref()
            .unwrap_or(DEFAULT_WORKSPACE_VAR)
    }

    pub fn env_name(&self) -> &str {
        self.env_name.as_deref().unwrap_or(DEFAULT_ENV_NAME)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Tools
        if other.tools.vcs.is_some() {
            self.tools.vcs = other.tools.vcs;
        }
        if other.tools.colcon.is_some() {
            self.tools.colcon = other.tools.colcon;
        }
        if other.tools.bash.is_some() {
            self.tools.bash = other.tools.bash;
        }
        if other.tools.python.is_some() {
            self.tools.python = other.tools.python;
        }

        // Build settings
        if other.build.workspace_dir.is_some() {
            self.build.workspace_dir = other.build.workspace_dir;
        }
        if other.build.package_dir.is_some() {
            self.build.package_dir = other.build.package_dir;
        }
        if other.build.toolchain_file.is_some() {
            self.build.toolchain_file = other.build.toolchain_file;
        }
        if other.build.toolchain_workspace_var.is_some() {
            self.build.toolchain_workspace_var = other.build.toolchain_workspace_var;
        }
        if other.build.env_name.is_some() {
            self.build.env_name = other.build.env_name;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.rosdock/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
