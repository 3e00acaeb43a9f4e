//! `rosdock env` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::{EnvArgs, EnvFormatArg};
use crate::commands::load_project;
use rosdock::env::BashEnvSource;
use rosdock::ops::{env, EnvFormat, EnvOptions};
use rosdock::util::fs::{absolutize, relative_path};
use rosdock::util::shell::{Shell, Status};
use rosdock::util::GlobalContext;

pub fn execute(args: EnvArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx, None)?;
    let config = project.config();

    let bash = args.bash.clone().unwrap_or_else(|| config.tools.bash());
    let format = match args.format {
        EnvFormatArg::Sh => EnvFormat::Sh,
        EnvFormatArg::Json => EnvFormat::Json,
    };
    let opts = EnvOptions {
        format,
        output_dir: absolutize(ctx.cwd(), &args.output_dir),
        env_name: args
            .name
            .clone()
            .unwrap_or_else(|| config.build.env_name().to_string()),
    };

    shell.status(
        Status::Harvesting,
        format!("{} dependencies", project.recipe().dependencies.len()),
    );
    let result = env(&project, &BashEnvSource::new(bash), &opts)?;

    match format {
        EnvFormat::Json => println!("{}", result.to_json()?),
        EnvFormat::Sh => {
            for path in &result.written {
                shell.status(Status::Created, relative_path(ctx.cwd(), path).display());
            }
            shell.json_event(&serde_json::json!({
                "reason": "env",
                "scripts": result.written,
            }));
        }
    }

    Ok(())
}
