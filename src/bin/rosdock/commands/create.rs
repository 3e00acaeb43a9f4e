//! `rosdock create` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::CreateArgs;
use crate::commands::build::build_options;
use crate::commands::{load_project, package};
use rosdock::ops::{create, CreateOptions, SourceOptions};
use rosdock::util::fs::absolutize;
use rosdock::util::shell::{Shell, Status};
use rosdock::util::GlobalContext;

pub fn execute(args: CreateArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let mut project = load_project(&ctx, Some(&args.build.tools))?;
    if let Some(ref dir) = args.package_dir {
        project.config_mut().build.package_dir = Some(absolutize(ctx.cwd(), dir));
    }

    let opts = CreateOptions {
        source: SourceOptions {
            vcs: project.config().tools.vcs(),
        },
        build: build_options(&ctx, &project, &args.build),
        keep_workspace: args.keep_workspace,
    };

    let span = shell.span(
        Status::Building,
        format!("{} {}", project.recipe().name(), project.recipe().version()),
    );
    let result = create(&project, &opts)?;
    span.finish();

    package::report(shell, &result);
    Ok(())
}
