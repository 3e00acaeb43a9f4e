//! rosdock CLI - package ROS 2 colcon workspaces

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use rosdock::util::Shell;

fn main() {
    let cli = Cli::parse();
    let shell = Arc::new(Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color(),
        cli.message_format == MessageFormat::Json,
    ));

    if let Err(e) = run(cli, &shell) {
        if shell.is_json() {
            shell.error(format!("{:#}", e));
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Arc<Shell>) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("rosdock=debug")
    } else if cli.quiet || cli.message_format == MessageFormat::Json {
        EnvFilter::new("rosdock=warn")
    } else {
        EnvFilter::new("rosdock=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Source(args) => commands::source::execute(args, shell),
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Package(args) => commands::package::execute(args, shell),
        Commands::Create(args) => commands::create::execute(args, shell),
        Commands::Env(args) => commands::env::execute(args, shell),
        Commands::Doctor => commands::doctor::execute(cli.verbose),
        Commands::Clean => commands::clean::execute(shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
