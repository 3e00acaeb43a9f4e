//! `rosdock build` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::load_project;
use rosdock::ops::{build, BuildOptions, Project};
use rosdock::util::fs::absolutize;
use rosdock::util::shell::{Shell, Status};
use rosdock::util::GlobalContext;

/// Build options from CLI flags over the project's configuration.
pub fn build_options(ctx: &GlobalContext, project: &Project, args: &BuildArgs) -> BuildOptions {
    let config = project.config();

    // --toolchain-file > config
    let toolchain_file = args
        .toolchain_file
        .as_ref()
        .map(|p| absolutize(ctx.cwd(), p))
        .or_else(|| project.toolchain_file());

    BuildOptions {
        colcon: config.tools.colcon(),
        python: config.tools.python(),
        toolchain_file,
        toolchain_workspace_var: Some(config.build.toolchain_workspace_var().to_string()),
        extra_cmake_args: args.cmake_args.clone(),
        stream_output: args.stream,
    }
}

pub fn execute(args: BuildArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx, Some(&args.tools))?;
    let opts = build_options(&ctx, &project, &args);

    let span = shell.span(
        Status::Building,
        format!("{} {}", project.recipe().name(), project.recipe().version()),
    );
    let result = build(&project, &opts)?;
    span.finish();

    for marker in &result.ignored {
        shell.status(Status::Ignoring, marker.display());
    }
    if shell.is_verbose() {
        for file in &result.overridden {
            shell.note(format!("replaced {}", file.display()));
        }
    }

    shell.json_event(&serde_json::json!({
        "reason": "built",
        "python-version": result.interpreter.version,
        "ignored": result.ignored,
        "search-paths": result.search_paths,
    }));

    Ok(())
}
