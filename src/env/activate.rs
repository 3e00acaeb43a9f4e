//! Activation scripts for a consolidated set of search paths.
//!
//! `activate_ros2.sh` prepends the harvested entries to each variable while
//! remembering the previous value; `deactivate_ros2.sh` restores it (or
//! unsets the variable if it was unset before activation).

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::env::search_paths::{SearchPaths, PATH_LIST_SEPARATOR};
use crate::util::fs::write_string;
use crate::util::process::shell_quote;

pub const ACTIVATE_SCRIPT: &str = "activate_ros2.sh";
pub const DEACTIVATE_SCRIPT: &str = "deactivate_ros2.sh";

/// Default prompt tag shown while the environment is active.
pub const DEFAULT_ENV_NAME: &str = "rosdockenv";

const OLD_PREFIX: &str = "ROSDOCK_OLD_";

/// Renders POSIX `sh` activation scripts for a set of search paths.
#[derive(Debug, Clone)]
pub struct ActivationScript<'a> {
    paths: &'a SearchPaths,
    env_name: String,
}

impl<'a> ActivationScript<'a> {
    pub fn new(paths: &'a SearchPaths) -> Self {
        ActivationScript {
            paths,
            env_name: DEFAULT_ENV_NAME.to_string(),
        }
    }

    pub fn with_env_name(mut self, name: impl Into<String>) -> Self {
        self.env_name = name.into();
        self
    }

    pub fn render_activate(&self) -> String {
        let mut out = String::from("#!/usr/bin/env sh\n# Generated by rosdock. Do not edit.\n\n");

        out.push_str(&save_line("PS1"));
        out.push_str(&format!(
            "PS1={}\"${{PS1-}}\"\nexport PS1\n\n",
            shell_quote(&format!("({}) ", self.env_name))
        ));

        for (var, entries) in self.paths.iter() {
            let name = var.as_str();
            let joined = entries.join(&PATH_LIST_SEPARATOR.to_string());
            out.push_str(&save_line(name));
            out.push_str(&format!(
                "{name}={value}\"${{{name}:+{sep}${name}}}\"\nexport {name}\n\n",
                name = name,
                value = shell_quote(&joined),
                sep = PATH_LIST_SEPARATOR,
            ));
        }

        out
    }

    pub fn render_deactivate(&self) -> String {
        let mut out = String::from("#!/usr/bin/env sh\n# Generated by rosdock. Do not edit.\n\n");

        out.push_str(&restore_line("PS1"));
        for (var, _) in self.paths.iter() {
            out.push_str(&restore_line(var.as_str()));
        }

        out
    }

    /// Write both scripts into `dir` and return their paths.
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let activate = dir.join(ACTIVATE_SCRIPT);
        let deactivate = dir.join(DEACTIVATE_SCRIPT);
        write_string(&activate, &self.render_activate())?;
        write_string(&deactivate, &self.render_deactivate())?;
        Ok(vec![activate, deactivate])
    }
}

fn save_line(name: &str) -> String {
    format!(
        "if [ -n \"${{{name}+x}}\" ]; then {old}{name}=\"${name}\"; export {old}{name}; fi\n",
        name = name,
        old = OLD_PREFIX,
    )
}

fn restore_line(name: &str) -> String {
    format!(
        "if [ -n \"${{{old}{name}+x}}\" ]; then {name}=\"${old}{name}\"; export {name}; \
         unset {old}{name}; else unset {name}; fi\n",
        name = name,
        old = OLD_PREFIX,
    )
}
