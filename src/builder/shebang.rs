//! Shebang rewriting for generated Python entry-point scripts.
//!
//! setuptools embeds the absolute path of the build interpreter in the
//! scripts it generates, which breaks once the install tree is moved.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::fs::list_files;

/// Hardcoded interpreter path some packages ship in their scripts.
pub const SYSTEM_PYTHON_SHEBANG: &str = "#!/usr/bin/python3";

/// Rewrites known absolute-interpreter shebangs to an `env` lookup.
#[derive(Debug, Clone)]
pub struct ShebangFixer {
    targets: Vec<String>,
    replacement: String,
}

impl ShebangFixer {
    /// `build_interpreter` is the interpreter that ran the build;
    /// `python_version` is the tag (`python3.8`) to look up on `PATH`.
    pub fn new(build_interpreter: &Path, python_version: &str) -> Self {
        ShebangFixer {
            targets: vec![
                format!("#!{}", build_interpreter.display()),
                SYSTEM_PYTHON_SHEBANG.to_string(),
            ],
            replacement: format!("#!/usr/bin/env {}", python_version),
        }
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Rewrite the first line of `content` if it is one of the targets.
    ///
    /// A target only matches as a whole word, so `#!/usr/bin/python3.8` is
    /// left alone while `#!/usr/bin/python3 -u` keeps its flag.
    pub fn rewrite(&self, content: &str) -> Option<String> {
        let (first, rest) = match content.find('\n') {
            Some(idx) => content.split_at(idx),
            None => (content, ""),
        };
        let first_trimmed = first.trim_end_matches('\r');

        let target = self.targets.iter().find(|t| {
            first_trimmed
                .strip_prefix(t.as_str())
                .is_some_and(|tail| tail.is_empty() || tail.starts_with([' ', '\t']))
        })?;

        let tail = &first[target.len()..];
        Some(format!("{}{}{}", self.replacement, tail, rest))
    }

    /// Patch one file. Returns whether it changed.
    ///
    /// Files that are not UTF-8 text are skipped.
    pub fn fix_file(&self, path: &Path) -> Result<bool> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let Ok(content) = String::from_utf8(bytes) else {
            return Ok(false);
        };
        match self.rewrite(&content) {
            Some(updated) => {
                std::fs::write(path, updated)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Patch every regular file directly inside `dir`.
    ///
    /// A missing directory is skipped. Returns the files that changed.
    pub fn fix_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            tracing::debug!("no scripts directory at {}", dir.display());
            return Ok(Vec::new());
        }

        let mut changed = Vec::new();
        for file in list_files(dir)? {
            if self.fix_file(&file)? {
                tracing::debug!("rewrote shebang of {}", file.display());
                changed.push(file);
            }
        }
        Ok(changed)
    }
}

/// Rewrite interpreter shebangs of the scripts in `scripts_dir`.
pub fn fix_shebangs(
    scripts_dir: &Path,
    build_interpreter: &Path,
    python_version: &str,
) -> Result<Vec<PathBuf>> {
    ShebangFixer::new(build_interpreter, python_version).fix_dir(scripts_dir)
}
