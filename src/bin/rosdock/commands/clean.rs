//! `rosdock clean` command

use std::sync::Arc;

use anyhow::Result;

use crate::commands::load_project;
use rosdock::ops::clean;
use rosdock::util::shell::{Shell, Status};
use rosdock::util::GlobalContext;

pub fn execute(shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx, None)?;
    let ws = project.workspace();

    if clean(&project)? {
        shell.status(Status::Removed, ws.root().display());
    } else {
        shell.status(Status::Skipped, format!("{} does not exist", ws.root().display()));
    }

    Ok(())
}
