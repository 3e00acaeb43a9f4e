//! COLCON_IGNORE markers for workspace packages that must not be built.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::RecipeError;
use crate::util::fs::{ensure_dir, is_contained_relative, read_to_string};

/// Marker file colcon looks for to skip a directory.
pub const COLCON_IGNORE: &str = "COLCON_IGNORE";

/// Parse an ignore list: one relative directory per line.
///
/// Blank lines and `#` comments are skipped; order is preserved.
pub fn parse_ignore_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read and parse an ignore list file.
pub fn load_ignore_list(path: &Path) -> Result<Vec<String>> {
    Ok(parse_ignore_list(&read_to_string(path)?))
}

/// Marker path for one ignore entry.
///
/// Entries that already name the marker file are used as-is.
pub fn marker_path(workspace_dir: &Path, entry: &str) -> Result<PathBuf> {
    let rel = Path::new(entry);
    if !is_contained_relative(rel) {
        return Err(RecipeError::InvalidIgnoreEntry {
            entry: entry.to_string(),
        }
        .into());
    }

    let target = workspace_dir.join(rel);
    if rel.file_name().is_some_and(|n| n == COLCON_IGNORE) {
        Ok(target)
    } else {
        Ok(target.join(COLCON_IGNORE))
    }
}

/// Create an empty `COLCON_IGNORE` in each named directory of the workspace.
///
/// Each entry is handled independently; the first failure aborts the rest.
pub fn apply_ignores<S: AsRef<str>>(workspace_dir: &Path, names: &[S]) -> Result<Vec<PathBuf>> {
    let mut created = Vec::with_capacity(names.len());
    for name in names {
        let marker = marker_path(workspace_dir, name.as_ref())?;
        if let Some(parent) = marker.parent() {
            ensure_dir(parent)?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&marker)
            .with_context(|| format!("failed to create {}", marker.display()))?;
        tracing::debug!("ignoring {}", name.as_ref());
        created.push(marker);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_ignore_list() {
        let list = parse_ignore_list("src/ros2/rviz\n\n# vendored\n  src/ros2/rosbag2  \n");
        assert_eq!(list, vec!["src/ros2/rviz", "src/ros2/rosbag2"]);
    }

    #[test]
    fn test_apply_ignores_creates_empty_markers() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path();

        let created = apply_ignores(ws, &["pkg_a", "pkg_b"]).unwrap();

        assert_eq!(created.len(), 2);
        for pkg in ["pkg_a", "pkg_b"] {
            let marker = ws.join(pkg).join(COLCON_IGNORE);
            assert!(marker.is_file());
            assert_eq!(std::fs::metadata(&marker).unwrap().len(), 0);
        }
    }

    #[test]
    fn test_apply_ignores_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        apply_ignores(tmp.path(), &["pkg_a"]).unwrap();
        apply_ignores(tmp.path(), &["pkg_a", "pkg_a"]).unwrap();

        let marker = tmp.path().join("pkg_a").join(COLCON_IGNORE);
        assert_eq!(std::fs::metadata(marker).unwrap().len(), 0);
    }

    #[test]
    fn test_entry_naming_marker_is_used_directly() {
        let ws = Path::new("/ws");
        assert_eq!(
            marker_path(ws, "src/rviz/COLCON_IGNORE").unwrap(),
            PathBuf::from("/ws/src/rviz/COLCON_IGNORE")
        );
    }

    #[test]
    fn test_escaping_entry_aborts_remaining() {
        let tmp = TempDir::new().unwrap();
        let err = apply_ignores(tmp.path(), &["pkg_a", "../outside", "pkg_b"]).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RecipeError>(),
            Some(RecipeError::InvalidIgnoreEntry { .. })
        ));
        assert!(tmp.path().join("pkg_a").join(COLCON_IGNORE).exists());
        assert!(!tmp.path().join("pkg_b").exists());
    }
}
