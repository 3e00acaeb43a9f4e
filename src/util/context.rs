//! Global context for rosdock operations.
//!
//! Provides centralized access to the working directory, configuration
//! locations and recipe discovery.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::core::errors::RecipeError;
use crate::core::recipe::find_recipe;
use crate::util::config::{load_config, Config};

/// Project directories for rosdock
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "rosdock", "rosdock"));

/// Name of the per-project settings directory.
pub const PROJECT_DIR: &str = ".rosdock";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config file
    config_dir: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let config_dir = PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf());

        Ok(GlobalContext {
            cwd,
            config_dir,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use a different directory for the global config file.
    pub fn with_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config_dir = dir;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path, if the platform has one.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|d| d.join("config.toml"))
    }

    /// Get the project-local settings directory next to a recipe.
    pub fn project_dir(recipe_dir: &Path) -> PathBuf {
        recipe_dir.join(PROJECT_DIR)
    }

    /// Find the recipe file starting from cwd and searching upward.
    pub fn find_recipe(&self) -> Result<PathBuf, RecipeError> {
        find_recipe(&self.cwd)
    }

    /// Merged global and project configuration for a recipe directory.
    pub fn config_for(&self, recipe_dir: &Path) -> Config {
        let project = Self::project_dir(recipe_dir).join("config.toml");
        load_config(self.config_path().as_deref(), &project)
    }
}
