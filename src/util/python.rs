//! Python interpreter detection.
//!
//! ROS 2 packages install Python modules that only work with the
//! interpreter version they were built against, so the detected version
//! names the site-packages directory and the rewritten shebangs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::errors::RecipeError;
use crate::util::process::ProcessBuilder;

const PROBE: &str = "import sys; print(sys.executable); print('python%d.%d' % sys.version_info[:2])";

/// A detected interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonInterpreter {
    /// Absolute path of the interpreter binary.
    pub executable: PathBuf,

    /// Version tag, e.g. `python3.8`.
    pub version: String,
}

impl PythonInterpreter {
    pub fn new(executable: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        PythonInterpreter {
            executable: executable.into(),
            version: version.into(),
        }
    }

    /// Run `program` once and read its executable path and version.
    pub fn detect(program: &Path) -> Result<Self> {
        let output = ProcessBuilder::new(program)
            .arg("-c")
            .arg(PROBE)
            .exec_and_check()
            .with_context(|| format!("failed to detect python interpreter `{}`", program.display()))?;

        Self::parse_probe(&String::from_utf8_lossy(&output.stdout))
    }

    fn parse_probe(stdout: &str) -> Result<Self> {
        let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
        let (Some(executable), Some(version)) = (lines.next(), lines.next()) else {
            bail!("unexpected python probe output: {:?}", stdout);
        };
        if !version.starts_with("python") {
            bail!("unexpected python version tag: {}", version);
        }
        Ok(PythonInterpreter::new(executable, version))
    }

    /// Check an explicitly requested version against the detected one.
    pub fn check_requested(&self, requested: Option<&str>) -> Result<(), RecipeError> {
        match requested {
            Some(req) if !req.is_empty() && req != self.version => {
                Err(RecipeError::PythonVersionConflict {
                    requested: req.to_string(),
                    detected: self.version.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe() {
        let py = PythonInterpreter::parse_probe("/usr/bin/python3\npython3.8\n").unwrap();
        assert_eq!(py.executable, PathBuf::from("/usr/bin/python3"));
        assert_eq!(py.version, "python3.8");
    }

    #[test]
    fn test_parse_probe_rejects_garbage() {
        assert!(PythonInterpreter::parse_probe("").is_err());
        assert!(PythonInterpreter::parse_probe("/usr/bin/python3\n3.8\n").is_err());
    }

    #[test]
    fn test_check_requested() {
        let py = PythonInterpreter::new("/usr/bin/python3", "python3.8");
        assert!(py.check_requested(None).is_ok());
        assert!(py.check_requested(Some("python3.8")).is_ok());
        assert!(matches!(
            py.check_requested(Some("python3.6")),
            Err(RecipeError::PythonVersionConflict { .. })
        ));
    }
}
