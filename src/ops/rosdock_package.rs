//! Implementation of `rosdock package`.
//!
//! Turns a built workspace into a relocatable package directory: scripts get
//! portable shebangs, the merged install tree is copied out, and the
//! workspace is discarded.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::fix_shebangs;
use crate::ops::Project;
use crate::util::fs::{clean_dir, copy_dir_all, remove_dir_all_if_exists, write_string};
use crate::util::PythonInterpreter;

/// Metadata file written at the package root.
pub const PACKAGE_METADATA_FILE: &str = "rosdock-package.toml";

/// Options for the package step.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Python interpreter the workspace was built with
    pub python: PathBuf,

    /// Leave the workspace in place after copying
    pub keep_workspace: bool,
}

/// Contents of `rosdock-package.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub python_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PackageMetadata {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct PackageResult {
    pub package_dir: PathBuf,
    pub fixed_scripts: Vec<PathBuf>,
    pub metadata: PackageMetadata,
}

/// Run the package step.
pub fn package(project: &Project, opts: &PackageOptions) -> Result<PackageResult> {
    let interpreter = PythonInterpreter::detect(&opts.python)?;
    package_with_interpreter(project, &interpreter, opts.keep_workspace)
}

/// Run the package step for an already-detected interpreter.
pub fn package_with_interpreter(
    project: &Project,
    interpreter: &PythonInterpreter,
    keep_workspace: bool,
) -> Result<PackageResult> {
    let package_dir = project.checked_package_dir()?;
    let ws = project.workspace();
    let install = ws.install_dir();
    if !install.is_dir() {
        bail!(
            "workspace `{}` has no install tree\n\
             hint: run `rosdock build` first",
            ws.root().display()
        );
    }

    let fixed_scripts = fix_shebangs(
        &ws.scripts_dir(),
        &interpreter.executable,
        &interpreter.version,
    )?;
    tracing::debug!("rewrote {} shebang(s)", fixed_scripts.len());

    clean_dir(&package_dir)?;
    copy_dir_all(&install, &package_dir)?;

    let recipe = project.recipe();
    let metadata = PackageMetadata {
        name: recipe.name().to_string(),
        version: recipe.version().to_string(),
        python_version: interpreter.version.clone(),
        description: recipe.package.description.clone(),
    };
    let rendered = toml::to_string_pretty(&metadata).context("failed to render package metadata")?;
    write_string(&package_dir.join(PACKAGE_METADATA_FILE), &rendered)?;

    if !keep_workspace {
        remove_dir_all_if_exists(ws.root())?;
    }

    tracing::info!("packaged {} into {}", recipe.name(), package_dir.display());
    Ok(PackageResult {
        package_dir,
        fixed_scripts,
        metadata,
    })
}
