//! Harvesting search paths from dependency setup scripts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::dependency::Dependency;
use crate::env::search_paths::SearchPaths;
use crate::util::process::ProcessBuilder;

/// Runs a setup script and reports the environment it leaves behind.
pub trait EnvSource {
    fn source(&self, script: &Path) -> Result<Vec<(String, String)>>;
}

/// Sources a script in a fresh `bash` and dumps its environment with `env`.
#[derive(Debug, Clone)]
pub struct BashEnvSource {
    bash: PathBuf,
}

impl BashEnvSource {
    pub fn new(bash: impl Into<PathBuf>) -> Self {
        BashEnvSource { bash: bash.into() }
    }
}

impl Default for BashEnvSource {
    fn default() -> Self {
        BashEnvSource::new("bash")
    }
}

impl EnvSource for BashEnvSource {
    fn source(&self, script: &Path) -> Result<Vec<(String, String)>> {
        // The script path travels as $1 so it never needs quoting.
        let output = ProcessBuilder::new(&self.bash)
            .arg("-c")
            .arg("source \"$1\" && env")
            .arg("bash")
            .arg(script)
            .exec_and_check()
            .with_context(|| format!("failed to source {}", script.display()))?;

        Ok(parse_env_dump(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `KEY=VALUE` lines; lines without `=` (continuations of multi-line
/// values) are skipped.
pub fn parse_env_dump(dump: &str) -> Vec<(String, String)> {
    dump.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.is_empty() && !key.contains(char::is_whitespace))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Build the consolidated search paths of every dependency that ships a
/// setup script, in declaration order.
///
/// Starts from an empty set: nothing from the calling environment leaks in.
pub fn harvest_dependencies(deps: &[Dependency], source: &dyn EnvSource) -> Result<SearchPaths> {
    let mut paths = SearchPaths::new();

    for dep in deps {
        let Some(script) = dep.existing_setup_script() else {
            tracing::debug!("{} has no setup script, skipping", dep.name);
            continue;
        };

        tracing::info!("harvesting environment of {}", dep.name);
        let pairs = source.source(&script)?;
        paths.merge_env(&pairs, dep);
    }

    Ok(paths)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    use crate::env::search_paths::SearchPathVar;

    /// Returns canned environments and records which scripts were sourced.
    struct MockEnvSource {
        dumps: Vec<(PathBuf, Vec<(String, String)>)>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl MockEnvSource {
        fn new() -> Self {
            MockEnvSource {
                dumps: Vec::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn expect(mut self, script: PathBuf, pairs: &[(&str, &str)]) -> Self {
            let pairs = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.dumps.push((script, pairs));
            self
        }
    }

    impl EnvSource for MockEnvSource {
        fn source(&self, script: &Path) -> Result<Vec<(String, String)>> {
            self.calls.borrow_mut().push(script.to_path_buf());
            self.dumps
                .iter()
                .find(|(s, _)| s == script)
                .map(|(_, pairs)| pairs.clone())
                .ok_or_else(|| anyhow::anyhow!("unexpected script {}", script.display()))
        }
    }

    fn dep_with_script(tmp: &TempDir, name: &str) -> Dependency {
        let dep = Dependency::new(name, tmp.path().join(name));
        std::fs::create_dir_all(&dep.root).unwrap();
        std::fs::write(dep.setup_script(), "").unwrap();
        dep
    }

    #[test]
    fn test_parse_env_dump() {
        let pairs = parse_env_dump("A=1\nB=x=y\ncontinued line\n=bad\nEMPTY=\n");
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "x=y".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_harvest_skips_dependencies_without_script() {
        let tmp = TempDir::new().unwrap();
        let core = dep_with_script(&tmp, "core");
        let plain = Dependency::new("spdlog", tmp.path().join("spdlog"));
        let core_lib = core.root.join("lib").to_string_lossy().into_owned();
        let ld_library_path = format!("{}:/usr/lib", core_lib);
        let bin = core.root.join("bin").to_string_lossy().into_owned();

        let source = MockEnvSource::new().expect(
            core.setup_script(),
            &[
                ("LD_LIBRARY_PATH", ld_library_path.as_str()),
                ("PATH", bin.as_str()),
            ],
        );

        let paths = harvest_dependencies(&[plain, core.clone()], &source).unwrap();

        assert_eq!(*source.calls.borrow(), vec![core.setup_script()]);
        assert_eq!(paths.get(SearchPathVar::LdLibraryPath), [core_lib]);
        assert_eq!(paths.to_env().len(), 1);
    }

    #[test]
    fn test_harvest_newest_dependency_first() {
        let tmp = TempDir::new().unwrap();
        let core = dep_with_script(&tmp, "core");
        let tf = dep_with_script(&tmp, "tf");
        let core_root = core.root.to_string_lossy().into_owned();
        let tf_root = tf.root.to_string_lossy().into_owned();

        let tf_value = format!("{}:{}", tf_root, core_root);

        let source = MockEnvSource::new()
            .expect(core.setup_script(), &[("AMENT_PREFIX_PATH", core_root.as_str())])
            .expect(tf.setup_script(), &[("AMENT_PREFIX_PATH", tf_value.as_str())]);

        let paths = harvest_dependencies(&[core, tf], &source).unwrap();
        assert_eq!(paths.get(SearchPathVar::AmentPrefixPath), [tf_root, core_root]);
    }

    #[test]
    fn test_harvest_failure_aborts() {
        let tmp = TempDir::new().unwrap();
        let core = dep_with_script(&tmp, "core");

        let err = harvest_dependencies(&[core], &MockEnvSource::new()).unwrap_err();
        assert!(err.to_string().contains("unexpected script"));
    }

    #[test]
    fn test_bash_source_reads_exports() {
        if crate::util::process::find_executable("bash").is_none() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("with space");
        std::fs::create_dir_all(&root).unwrap();
        let script = root.join("local_setup.bash");
        std::fs::write(
            &script,
            format!("export CMAKE_PREFIX_PATH=\"{}\"\n", root.display()),
        )
        .unwrap();

        let pairs = BashEnvSource::default().source(&script).unwrap();
        assert!(pairs
            .iter()
            .any(|(k, v)| k == "CMAKE_PREFIX_PATH" && v == &root.to_string_lossy()));
    }
}
