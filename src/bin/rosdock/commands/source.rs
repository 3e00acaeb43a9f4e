//! `rosdock source` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::SourceArgs;
use crate::commands::load_project;
use rosdock::ops::{source, SourceOptions};
use rosdock::util::shell::{Shell, Status};
use rosdock::util::GlobalContext;

pub fn execute(args: SourceArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx, Some(&args.tools))?;

    let opts = SourceOptions {
        vcs: project.config().tools.vcs(),
    };

    let span = shell.span(
        Status::Importing,
        format!("{} {}", project.recipe().name(), project.recipe().version()),
    );
    let ws = source(&project, &opts)?;
    span.finish();

    shell.json_event(&serde_json::json!({
        "reason": "sourced",
        "workspace": ws.root(),
    }));

    Ok(())
}
