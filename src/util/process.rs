//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{bail, Context, Result};

/// Builder for subprocess execution.
///
/// Every external tool (`vcs`, `colcon`, `bash`, `python3`) is spawned
/// through this type, one at a time, and waited on until it exits.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    env_remove: Vec<String>,
    cwd: Option<PathBuf>,
    stdin: Option<Vec<u8>>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            env_remove: Vec::new(),
            cwd: None,
            stdin: None,
        }
    }

    /// Run a full command line through `sh -c`.
    ///
    /// Used where a tool expects a pre-joined flag string, so the shell does
    /// the word splitting exactly as it would for a user typing the line.
    pub fn shell(command_line: impl Into<String>) -> Self {
        ProcessBuilder::new("sh").arg("-c").arg(command_line.into())
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set several environment variables at once.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self.env
                .insert(key.as_ref().to_string(), value.as_ref().to_string());
        }
        self
    }

    /// Remove an environment variable.
    pub fn env_remove(mut self, key: impl AsRef<str>) -> Self {
        self.env_remove.push(key.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Set stdin data.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the environment overrides.
    pub fn get_envs(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Get the working directory, if set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        for key in &self.env_remove {
            cmd.env_remove(key);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion.
    ///
    /// Stdout and stderr are read to completion before this returns.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();

        if self.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("running `{}`", self.display_command());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        if let Some(ref stdin_data) = self.stdin {
            use std::io::Write;
            // Dropping the handle closes the pipe so the child sees EOF.
            if let Some(mut stdin) = child.stdin.take() {
                match stdin.write_all(stdin_data) {
                    // The child exited without reading all of its input
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                    other => other.with_context(|| {
                        format!("failed to write stdin of `{}`", self.program.display())
                    })?,
                }
            }
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;

        Ok(output)
    }

    /// Execute and require success.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                stderr.trim_end()
            );
        }
        Ok(output)
    }

    /// Execute with inherited stdio and return status only.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status)
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Single-quote a word for POSIX sh.
pub fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a configured tool, failing with an install hint when it is missing.
pub fn require_tool(program: &Path, hint: &str) -> Result<PathBuf> {
    match find_executable(program) {
        Some(path) => Ok(path),
        None => bail!(
            "`{}` not found\n\
             \n\
             {}\n\
             Install it and ensure it's in your PATH.",
            program.display(),
            hint
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_builder() {
        let output = ProcessBuilder::new("echo").arg("hello").exec().unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/opt/ros"), "'/opt/ros'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("colcon").args(["build", "--merge-install"]);

        assert_eq!(pb.display_command(), "colcon build --merge-install");
    }

    #[test]
    fn test_stdin_is_piped() {
        let output = ProcessBuilder::new("cat")
            .stdin("repositories:\n")
            .exec_and_check()
            .unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout), "repositories:\n");
    }

    #[test]
    fn test_env_is_materialized_on_child() {
        let output = ProcessBuilder::shell("echo $ROSDOCK_TEST_VAR")
            .env("ROSDOCK_TEST_VAR", "/opt/ros")
            .exec_and_check()
            .unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/opt/ros");
    }

    #[test]
    fn test_exec_and_check_reports_failure() {
        let err = ProcessBuilder::shell("echo boom >&2; exit 3")
            .exec_and_check()
            .unwrap_err();

        let msg = format!("{:#}", err);
        assert!(msg.contains("Some(3)"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_require_tool_missing() {
        let err = require_tool(Path::new("rosdock-definitely-not-a-tool"), "needed for tests").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
