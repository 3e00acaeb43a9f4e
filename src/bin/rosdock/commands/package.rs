//! `rosdock package` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::PackageArgs;
use crate::commands::load_project;
use rosdock::ops::{package, PackageOptions, PackageResult};
use rosdock::util::fs::absolutize;
use rosdock::util::shell::{Shell, Status};
use rosdock::util::GlobalContext;

pub fn execute(args: PackageArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let mut project = load_project(&ctx, Some(&args.tools))?;
    if let Some(ref dir) = args.package_dir {
        project.config_mut().build.package_dir = Some(absolutize(ctx.cwd(), dir));
    }

    let opts = PackageOptions {
        python: project.config().tools.python(),
        keep_workspace: args.keep_workspace,
    };

    let result = package(&project, &opts)?;
    report(shell, &result);

    Ok(())
}

/// Print the outcome of a packaging run.
pub fn report(shell: &Shell, result: &PackageResult) {
    for script in &result.fixed_scripts {
        shell.status(Status::Fixed, script.display());
    }
    shell.status(
        Status::Packaged,
        format!(
            "{} {} ({}) into {}",
            result.metadata.name,
            result.metadata.version,
            result.metadata.python_version,
            result.package_dir.display()
        ),
    );

    shell.json_event(&serde_json::json!({
        "reason": "packaged",
        "name": result.metadata.name,
        "version": result.metadata.version,
        "python-version": result.metadata.python_version,
        "package-dir": result.package_dir,
        "fixed-scripts": result.fixed_scripts,
    }));
}
