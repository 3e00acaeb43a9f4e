//! Implementation of `rosdock env`.
//!
//! Consolidates the runtime search paths of every declared dependency into
//! one activation script, or a JSON document for other tooling.

use std::path::PathBuf;

use anyhow::Result;

use crate::env::{harvest_dependencies, ActivationScript, EnvSource, SearchPaths};
use crate::ops::Project;
use crate::util::fs::ensure_dir;

/// Output format of the env command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvFormat {
    /// `activate_ros2.sh` and `deactivate_ros2.sh`
    #[default]
    Sh,
    /// JSON object mapping variable names to entry lists
    Json,
}

#[derive(Debug, Clone)]
pub struct EnvOptions {
    pub format: EnvFormat,

    /// Where scripts are written (sh format only)
    pub output_dir: PathBuf,

    /// Prompt tag shown while active
    pub env_name: String,
}

#[derive(Debug, Clone)]
pub struct EnvResult {
    pub paths: SearchPaths,

    /// Scripts written, empty for JSON
    pub written: Vec<PathBuf>,
}

impl EnvResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.paths)?)
    }
}

/// Harvest dependency environments and render them.
pub fn env(project: &Project, source: &dyn EnvSource, opts: &EnvOptions) -> Result<EnvResult> {
    let paths = harvest_dependencies(&project.recipe().dependencies, source)?;

    let written = match opts.format {
        EnvFormat::Json => Vec::new(),
        EnvFormat::Sh => {
            ensure_dir(&opts.output_dir)?;
            ActivationScript::new(&paths)
                .with_env_name(&opts.env_name)
                .write(&opts.output_dir)?
        }
    };

    Ok(EnvResult { paths, written })
}
