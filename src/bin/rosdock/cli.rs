//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use rosdock::util::shell::ColorChoice;

/// rosdock - package ROS 2 colcon workspaces into relocatable install trees
#[derive(Parser)]
#[command(name = "rosdock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format for status messages
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn color(&self) -> ColorChoice {
        if self.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare the workspace and import the repositories of the recipe
    Source(SourceArgs),

    /// Build the workspace with colcon
    Build(BuildArgs),

    /// Copy the install tree into the package directory
    Package(PackageArgs),

    /// Run source, build and package in sequence
    Create(CreateArgs),

    /// Generate an activation script for the recipe's dependencies
    Env(EnvArgs),

    /// Check that the required external tools are available
    Doctor,

    /// Remove the workspace directory
    Clean,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Clone)]
pub struct ToolArgs {
    /// vcstool executable
    #[arg(long, env = "ROSDOCK_VCS")]
    pub vcs: Option<PathBuf>,

    /// colcon executable
    #[arg(long, env = "ROSDOCK_COLCON")]
    pub colcon: Option<PathBuf>,

    /// Python interpreter the workspace is built against
    #[arg(long, env = "ROSDOCK_PYTHON")]
    pub python: Option<PathBuf>,

    /// Workspace directory (default `_ws` next to the recipe)
    #[arg(long, env = "ROSDOCK_WORKSPACE")]
    pub workspace: Option<PathBuf>,
}

#[derive(Args)]
pub struct SourceArgs {
    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(Args, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub tools: ToolArgs,

    /// CMake toolchain file; enables cross-compilation
    #[arg(long, env = "ROSDOCK_TOOLCHAIN_FILE")]
    pub toolchain_file: Option<PathBuf>,

    /// Extra CMake argument (repeatable)
    #[arg(long = "cmake-arg", allow_hyphen_values = true)]
    pub cmake_args: Vec<String>,

    /// Show colcon output while it runs
    #[arg(long)]
    pub stream: bool,
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(flatten)]
    pub tools: ToolArgs,

    /// Package output directory (default `package` next to the recipe)
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// Keep the workspace after packaging
    #[arg(long)]
    pub keep_workspace: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Package output directory (default `package` next to the recipe)
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// Keep the workspace after packaging
    #[arg(long)]
    pub keep_workspace: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Directory the activation scripts are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "sh")]
    pub format: EnvFormatArg,

    /// Prompt tag shown while the environment is active
    #[arg(long)]
    pub name: Option<String>,

    /// bash used to source dependency setup scripts
    #[arg(long, env = "ROSDOCK_BASH")]
    pub bash: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvFormatArg {
    Sh,
    Json,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
