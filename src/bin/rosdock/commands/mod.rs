//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod create;
pub mod doctor;
pub mod env;
pub mod package;
pub mod source;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::ToolArgs;
use rosdock::ops::Project;
use rosdock::util::fs::absolutize;
use rosdock::util::GlobalContext;

/// Load the project of the current directory with CLI overrides applied.
pub fn load_project(ctx: &GlobalContext, tools: Option<&ToolArgs>) -> Result<Project> {
    let mut project = Project::load(ctx)?;

    if let Some(tools) = tools {
        let cwd = ctx.cwd();
        let config = project.config_mut();
        if let Some(ref vcs) = tools.vcs {
            config.tools.vcs = Some(resolve_tool(cwd, vcs));
        }
        if let Some(ref colcon) = tools.colcon {
            config.tools.colcon = Some(resolve_tool(cwd, colcon));
        }
        if let Some(ref python) = tools.python {
            config.tools.python = Some(resolve_tool(cwd, python));
        }
        if let Some(ref ws) = tools.workspace {
            config.build.workspace_dir = Some(absolutize(cwd, ws));
        }
    }

    Ok(project)
}

/// Bare names stay bare so they are looked up on `PATH`.
fn resolve_tool(cwd: &Path, tool: &Path) -> PathBuf {
    if tool.components().count() > 1 {
        absolutize(cwd, tool)
    } else {
        tool.to_path_buf()
    }
}
