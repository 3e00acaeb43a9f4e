//! colcon adapter for ROS 2 workspaces.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::builder::cross::CrossToolchain;
use crate::core::Workspace;
use crate::env::SearchPaths;
use crate::util::process::{require_tool, shell_quote, ProcessBuilder};

/// Flags passed to every `colcon build`.
pub const BASE_FLAGS: [&str; 2] = ["--merge-install", "--cmake-force-configure"];

/// The combined `--cmake-args` flag, or `None` when there is nothing to pass.
///
/// colcon takes the CMake arguments as one space-joined group so they do
/// not need to be repeated per flag.
pub fn cmake_args_flag<S: AsRef<str>>(args: &[S]) -> Option<String> {
    if args.is_empty() {
        return None;
    }
    let joined = args.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
    Some(format!("--cmake-args {}", joined))
}

/// colcon build adapter.
pub struct ColconBuilder<'a> {
    colcon: PathBuf,
    workspace: &'a Workspace,
    cmake_args: Vec<String>,
    search_paths: SearchPaths,
    cross: Option<CrossToolchain>,
    stream_output: bool,
}

impl<'a> ColconBuilder<'a> {
    /// Create a builder running `colcon` inside `workspace`.
    pub fn new(colcon: impl Into<PathBuf>, workspace: &'a Workspace) -> Self {
        ColconBuilder {
            colcon: colcon.into(),
            workspace,
            cmake_args: Vec::new(),
            search_paths: SearchPaths::new(),
            cross: None,
            stream_output: false,
        }
    }

    /// Add CMake arguments.
    pub fn cmake_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.cmake_args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Search paths materialized on the colcon process.
    pub fn search_paths(mut self, paths: SearchPaths) -> Self {
        self.search_paths = paths;
        self
    }

    /// Enable cross-compilation with the given toolchain.
    pub fn cross(mut self, cross: Option<CrossToolchain>) -> Self {
        self.cross = cross;
        self
    }

    /// Let colcon write straight to the terminal instead of capturing.
    pub fn stream_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }

    /// All CMake arguments, including the toolchain file when cross building.
    pub fn effective_cmake_args(&self) -> Vec<String> {
        let mut args = self.cmake_args.clone();
        if let Some(ref cross) = self.cross {
            args.push(cross.cmake_arg());
        }
        args
    }

    /// The flags after `colcon build`.
    pub fn flags(&self) -> Vec<String> {
        let mut flags: Vec<String> = BASE_FLAGS.iter().map(|f| f.to_string()).collect();
        if let Some(flag) = cmake_args_flag(&self.effective_cmake_args()) {
            flags.push(flag);
        }
        flags
    }

    /// The full process, ready to run.
    pub fn command(&self) -> ProcessBuilder {
        let command_line = format!(
            "{} build {}",
            shell_quote(&self.colcon.to_string_lossy()),
            self.flags().join(" ")
        );

        let mut cmd = ProcessBuilder::shell(command_line)
            .cwd(self.workspace.root())
            .envs(self.search_paths.to_env());

        if let Some(ref cross) = self.cross {
            let (var, value) = cross.workspace_env(self.workspace.root(), &self.search_paths);
            cmd = cmd.env(var, value);
        }

        cmd
    }

    /// Run `colcon build` once and wait for it.
    pub fn build(&self) -> Result<()> {
        require_tool(
            &self.colcon,
            "colcon builds the workspace: pip install colcon-common-extensions",
        )?;
        tracing::info!("Building workspace {}", self.workspace.root().display());

        let cmd = self.command();
        if self.stream_output {
            let status = cmd.status()?;
            if !status.success() {
                bail!(
                    "colcon build failed with exit code {:?}",
                    status.code()
                );
            }
        } else {
            cmd.exec_and_check().context("colcon build failed")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SearchPathVar;
    use tempfile::TempDir;

    #[test]
    fn test_cmake_args_flag() {
        assert_eq!(
            cmake_args_flag(&["-DX=1", "-DY=2"]).as_deref(),
            Some("--cmake-args -DX=1 -DY=2")
        );
        assert!(cmake_args_flag::<&str>(&[]).is_none());
    }

    #[test]
    fn test_flags_have_one_combined_cmake_flag() {
        let ws = Workspace::new("/build/_ws");
        let builder = ColconBuilder::new("colcon", &ws).cmake_args(["-DX=1", "-DY=2"]);

        let flags = builder.flags();
        assert_eq!(
            flags,
            vec![
                "--merge-install",
                "--cmake-force-configure",
                "--cmake-args -DX=1 -DY=2",
            ]
        );
        assert_eq!(flags.iter().filter(|f| f.starts_with("--cmake-args")).count(), 1);
    }

    #[test]
    fn test_flags_without_cmake_args() {
        let ws = Workspace::new("/build/_ws");
        let builder = ColconBuilder::new("colcon", &ws);
        assert_eq!(builder.flags(), BASE_FLAGS.to_vec());
    }

    #[test]
    fn test_cross_adds_toolchain_and_env() {
        let ws = Workspace::new("/build/_ws");
        let mut paths = SearchPaths::new();
        paths.prepend(SearchPathVar::AmentPrefixPath, "/pkgs/core");

        let builder = ColconBuilder::new("colcon", &ws)
            .cmake_args(["-DBUILD_TESTING:BOOL=OFF"])
            .search_paths(paths)
            .cross(Some(CrossToolchain::new("/tc/generic_linux.cmake")));

        assert_eq!(
            builder.flags().last().unwrap(),
            "--cmake-args -DBUILD_TESTING:BOOL=OFF -DCMAKE_TOOLCHAIN_FILE=/tc/generic_linux.cmake"
        );

        let cmd = builder.command();
        assert_eq!(cmd.get_cwd(), Some(ws.root()));
        assert_eq!(
            cmd.get_envs().get("ROS2_CONAN_WORKSPACE").map(String::as_str),
            Some("/build/_ws;/pkgs/core")
        );
        assert_eq!(
            cmd.get_envs().get("AMENT_PREFIX_PATH").map(String::as_str),
            Some("/pkgs/core")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_build_runs_in_workspace_with_split_args() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path().join("_ws"));
        ws.clean().unwrap();

        // Records cwd and one argument per line
        let colcon = tmp.path().join("colcon");
        std::fs::write(
            &colcon,
            "#!/bin/sh\npwd > args.txt\nfor a in \"$@\"; do echo \"$a\" >> args.txt; done\n",
        )
        .unwrap();
        std::fs::set_permissions(&colcon, std::fs::Permissions::from_mode(0o755)).unwrap();

        ColconBuilder::new(&colcon, &ws)
            .cmake_args(["-DX=1", "-DY=2"])
            .build()
            .unwrap();

        let recorded = std::fs::read_to_string(ws.root().join("args.txt")).unwrap();
        let lines: Vec<_> = recorded.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "build",
                "--merge-install",
                "--cmake-force-configure",
                "--cmake-args",
                "-DX=1",
                "-DY=2",
            ]
        );
    }

    #[test]
    fn test_build_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let err = ColconBuilder::new("false", &ws).build().unwrap_err();
        assert!(format!("{:#}", err).contains("colcon build failed"));
    }
}
