//! System requirement checks.
//!
//! The `doctor` command verifies that the external tools rosdock drives are
//! available before a long packaging run is started.
//!
//! ## Checks Performed
//!
//! - `vcs` (vcstool) for repository import
//! - `colcon` for building the workspace
//! - `bash` for sourcing dependency setup scripts
//! - `python3`, including the detected `pythonX.Y` version
//! - The configured toolchain file, when cross-compiling

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::util::config::Config;
use crate::util::process::{find_executable, ProcessBuilder};
use crate::util::PythonInterpreter;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// How long the check took
    pub duration: Duration,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: false,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub total_duration: Duration,
    pub environment: HashMap<String, String>,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// Run every check against the configured tools.
pub fn doctor(config: &Config, toolchain_file: Option<&Path>) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    report
        .environment
        .insert("os".to_string(), std::env::consts::OS.to_string());
    report
        .environment
        .insert("arch".to_string(), std::env::consts::ARCH.to_string());

    report.add(check_tool(
        "vcstool",
        &config.tools.vcs(),
        "--version",
        "needed to import repositories; install with `pip install vcstool`",
    ));
    report.add(check_tool(
        "colcon",
        &config.tools.colcon(),
        "version-check",
        "needed to build workspaces; install with `pip install colcon-common-extensions`",
    ));
    report.add(check_tool(
        "bash",
        &config.tools.bash(),
        "--version",
        "needed to source dependency setup scripts",
    ));
    report.add(check_python(&config.tools.python()));

    if let Some(file) = toolchain_file {
        report.add(check_toolchain_file(file));
    }

    report.total_duration = start.elapsed();
    report
}

/// Check that `program` resolves and grab the first line of its version output.
fn check_tool(name: &str, program: &Path, version_arg: &str, hint: &str) -> CheckResult {
    let start = Instant::now();

    let Some(path) = find_executable(program) else {
        return CheckResult::fail(name, format!("`{}` not found ({})", program.display(), hint))
            .with_duration(start.elapsed());
    };

    let mut result = CheckResult::pass(name, format!("{} is available", name)).with_path(path);
    if let Ok(output) = ProcessBuilder::new(program).arg(version_arg).exec() {
        // Some tools print their version on stderr
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        if let Some(line) = text.lines().map(str::trim).find(|l| !l.is_empty()) {
            result = result.with_version(line);
        }
    }

    result.with_duration(start.elapsed())
}

fn check_python(program: &Path) -> CheckResult {
    let start = Instant::now();

    match PythonInterpreter::detect(program) {
        Ok(interpreter) => CheckResult::pass(
            "python",
            format!("packages will target {}", interpreter.version),
        )
        .with_path(interpreter.executable)
        .with_version(interpreter.version)
        .with_duration(start.elapsed()),
        Err(e) => CheckResult::fail("python", format!("{:#}", e)).with_duration(start.elapsed()),
    }
}

fn check_toolchain_file(file: &Path) -> CheckResult {
    if file.is_file() {
        CheckResult::pass("toolchain file", "cross-compilation toolchain found")
            .with_path(file.to_path_buf())
    } else {
        CheckResult::fail(
            "toolchain file",
            format!("configured toolchain file does not exist: {}", file.display()),
        )
        .with_path(file.to_path_buf())
    }
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(output, "rosdock doctor");
    let _ = writeln!(output, "==============\n");

    if verbose {
        let unknown = "unknown".to_string();
        let _ = writeln!(output, "Environment:");
        let _ = writeln!(
            output,
            "  OS: {} ({})\n",
            report.environment.get("os").unwrap_or(&unknown),
            report.environment.get("arch").unwrap_or(&unknown)
        );
    }

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };

        let _ = writeln!(output, "  {} {}{}", status, check.name, required);

        if verbose || !check.passed {
            let _ = writeln!(output, "      {}", check.message);
        }
        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
            if let Some(version) = &check.version {
                let _ = writeln!(output, "      Version: {}", version);
            }
        }
    }

    let _ = writeln!(output);

    let passed = report.passed_count();
    let failed = report.failed_count();
    let required_failed = report.required_failed_count();

    let _ = writeln!(output, "Summary: {} passed, {} failed", passed, failed);

    if required_failed > 0 {
        let _ = writeln!(
            output,
            "\n{} required check(s) failed. Packaging will not work until they are fixed.",
            required_failed
        );
    } else if failed > 0 {
        let _ = writeln!(
            output,
            "\nAll required checks passed. {} optional check(s) failed.",
            failed
        );
    } else {
        let _ = writeln!(output, "\nAll checks passed. rosdock is ready to use.");
    }

    output
}
