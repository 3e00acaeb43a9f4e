//! Implementation of `rosdock build`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::builder::{ColconBuilder, CrossToolchain};
use crate::core::errors::RecipeError;
use crate::core::ignore::{apply_ignores, load_ignore_list};
use crate::core::Workspace;
use crate::env::SearchPaths;
use crate::ops::Project;
use crate::util::fs::{ensure_dir, is_contained_relative};
use crate::util::PythonInterpreter;

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// `colcon` executable
    pub colcon: PathBuf,

    /// Python interpreter the workspace is built against
    pub python: PathBuf,

    /// Toolchain file; enables cross-compilation when set
    pub toolchain_file: Option<PathBuf>,

    /// Variable the toolchain file reads workspace roots from
    pub toolchain_workspace_var: Option<String>,

    /// CMake arguments appended after the recipe's own
    pub extra_cmake_args: Vec<String>,

    /// Let colcon write to the terminal
    pub stream_output: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            colcon: PathBuf::from("colcon"),
            python: PathBuf::from("python3"),
            toolchain_file: None,
            toolchain_workspace_var: None,
            extra_cmake_args: Vec::new(),
            stream_output: false,
        }
    }
}

/// What a build did besides running colcon.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub interpreter: PythonInterpreter,

    /// `COLCON_IGNORE` markers created
    pub ignored: Vec<PathBuf>,

    /// Workspace files replaced by recipe overrides
    pub overridden: Vec<PathBuf>,

    /// Search paths colcon ran with
    pub search_paths: SearchPaths,
}

/// Build the workspace, seeding search paths from the process environment.
pub fn build(project: &Project, opts: &BuildOptions) -> Result<BuildResult> {
    build_with_paths(project, opts, SearchPaths::from_process_env())
}

/// Build the workspace on top of an explicit set of search paths.
pub fn build_with_paths(
    project: &Project,
    opts: &BuildOptions,
    base_paths: SearchPaths,
) -> Result<BuildResult> {
    let recipe = project.recipe();
    let ws = project.workspace();

    if !ws.source_dir().is_dir() {
        bail!(
            "workspace `{}` has no sources\n\
             hint: run `rosdock source` first",
            ws.root().display()
        );
    }

    let interpreter = PythonInterpreter::detect(&opts.python)?;
    interpreter.check_requested(recipe.options.python_version.as_deref())?;
    tracing::info!("building against {}", interpreter.version);

    let ignored = match recipe.ignore_list_path() {
        Some(path) => {
            let names = load_ignore_list(&path)?;
            apply_ignores(ws.root(), &names)?
        }
        None => Vec::new(),
    };

    let overridden = apply_overrides(project, &ws)?;

    let mut search_paths = base_paths;
    for dep in &recipe.dependencies {
        search_paths.export_root(&dep.root, &interpreter.version);
    }

    let cross = opts.toolchain_file.as_ref().map(|file| {
        let toolchain = CrossToolchain::new(file);
        match opts.toolchain_workspace_var {
            Some(ref var) => toolchain.with_workspace_var(var),
            None => toolchain,
        }
    });
    if let Some(ref cross) = cross {
        tracing::info!("cross compiling with {}", cross.toolchain_file().display());
    }

    ColconBuilder::new(&opts.colcon, &ws)
        .cmake_args(recipe.build.cmake_args.iter().cloned())
        .cmake_args(opts.extra_cmake_args.iter().cloned())
        .search_paths(search_paths.clone())
        .cross(cross)
        .stream_output(opts.stream_output)
        .build()?;

    Ok(BuildResult {
        interpreter,
        ignored,
        overridden,
        search_paths,
    })
}

/// Copy every recipe override over its workspace destination.
///
/// All overrides are checked before any file is copied.
fn apply_overrides(project: &Project, ws: &Workspace) -> Result<Vec<PathBuf>> {
    let mut planned = Vec::new();
    for file in &project.recipe().build.overrides {
        if !is_contained_relative(&file.to) {
            return Err(RecipeError::InvalidOverrideTarget {
                to: file.to.clone(),
            }
            .into());
        }
        let from = project.recipe().override_source(file);
        if !from.is_file() {
            return Err(RecipeError::OverrideSourceMissing { path: from }.into());
        }
        planned.push((from, ws.root().join(&file.to)));
    }

    let mut replaced = Vec::new();
    for (from, to) in planned {
        if let Some(parent) = to.parent() {
            ensure_dir(parent)?;
        }
        std::fs::copy(&from, &to).with_context(|| {
            format!("failed to copy {} to {}", from.display(), to.display())
        })?;
        tracing::debug!("replaced {}", to.display());
        replaced.push(to);
    }
    Ok(replaced)
}
