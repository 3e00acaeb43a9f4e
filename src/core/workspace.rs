//! Workspace - the colcon directory tree for one package build.
//!
//! A workspace has three fixed children: `src` (imported repositories),
//! `build` (colcon build artifacts) and `install` (merged install tree).
//! It is created empty, populated by `vcs import`, built by colcon, and
//! discarded once its install tree has been copied out.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::RecipeError;
use crate::util::fs::{clean_dir, ensure_dir};
use crate::util::process::ProcessBuilder;

/// Default workspace directory name, relative to the recipe.
pub const DEFAULT_WORKSPACE_DIR: &str = "_ws";

pub const SOURCE_DIR: &str = "src";
pub const BUILD_DIR: &str = "build";
pub const INSTALL_DIR: &str = "install";

/// File name the fetched repository manifest is stored under.
pub const MANIFEST_FILE: &str = "ros2.repos";

/// A colcon workspace rooted at an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SOURCE_DIR)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    pub fn install_dir(&self) -> PathBuf {
        self.root.join(INSTALL_DIR)
    }

    /// Scripts generated by setuptools entry points.
    pub fn scripts_dir(&self) -> PathBuf {
        self.install_dir().join("bin")
    }

    /// Where the fetched `.repos` manifest is stored.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Remove and recreate the workspace so it is guaranteed empty.
    pub fn clean(&self) -> Result<()> {
        tracing::debug!("cleaning workspace {}", self.root.display());
        clean_dir(&self.root)
    }

    /// Import the repositories listed in `manifest` into the source directory.
    pub fn import_repositories(&self, vcs: &Path, manifest: &Path, strict: bool) -> Result<bool> {
        import_repositories(vcs, &self.source_dir(), manifest, strict)
    }
}

/// Run `vcs import <source_dir>` with `manifest` on stdin.
///
/// A missing manifest is an error when `strict` is set and a no-op otherwise;
/// in both cases no process is spawned. Returns whether an import ran.
pub fn import_repositories(
    vcs: &Path,
    source_dir: &Path,
    manifest: &Path,
    strict: bool,
) -> Result<bool> {
    if !manifest.is_file() {
        if strict {
            return Err(RecipeError::ManifestNotFound {
                path: manifest.to_path_buf(),
            }
            .into());
        }
        tracing::debug!("no manifest at {}, skipping import", manifest.display());
        return Ok(false);
    }

    let contents = std::fs::read(manifest)
        .with_context(|| format!("failed to read manifest: {}", manifest.display()))?;

    ensure_dir(source_dir)?;

    tracing::info!("importing repositories into {}", source_dir.display());
    ProcessBuilder::new(vcs)
        .arg("import")
        .arg(source_dir)
        .stdin(contents)
        .exec_and_check()
        .context("repository import failed")?;

    Ok(true)
}
