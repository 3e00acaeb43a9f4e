//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Recursively copy the contents of `src` into `dst`.
///
/// Symlinks are recreated rather than followed, since colcon install trees
/// use them for versioned shared libraries.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("path escaped copy root: {}", entry.path().display()))?;
        let dst_path = dst.join(rel);
        let ty = entry.file_type();

        if ty.is_dir() {
            ensure_dir(&dst_path)?;
        } else if ty.is_symlink() {
            let target = fs::read_link(entry.path())
                .with_context(|| format!("failed to read link: {}", entry.path().display()))?;
            if dst_path.symlink_metadata().is_ok() {
                fs::remove_file(&dst_path).with_context(|| {
                    format!("failed to replace existing file: {}", dst_path.display())
                })?;
            }
            symlink(&target, &dst_path)
                .with_context(|| format!("failed to create link: {}", dst_path.display()))?;
        } else {
            fs::copy(entry.path(), &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove and recreate `path` so that it exists and is empty.
pub fn clean_dir(path: &Path) -> Result<()> {
    remove_dir_all_if_exists(path)?;
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// List regular files directly inside `dir`, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Make `path` absolute by joining it onto `base` when relative.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Check if a path is inside another path, comparing normalized components.
pub fn is_inside(path: &Path, parent: &Path) -> bool {
    normalize_path(path).starts_with(normalize_path(parent))
}

/// Whether `path` is relative and never climbs out of the directory it is
/// joined onto.
pub fn is_contained_relative(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_dir_empties_existing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("_ws");
        fs::create_dir_all(dir.join("src/nested")).unwrap();
        fs::write(dir.join("foo.txt"), "stale").unwrap();

        clean_dir(&dir).unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("foo.txt").exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_dir_creates_missing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/c");

        clean_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_copy_dir_all() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("install");
        let dst = tmp.path().join("package");

        fs::create_dir_all(src.join("lib")).unwrap();
        fs::write(src.join("lib/librcl.so.1"), "elf").unwrap();
        fs::write(src.join("local_setup.bash"), "# setup").unwrap();
        #[cfg(unix)]
        symlink(Path::new("librcl.so.1"), &src.join("lib/librcl.so")).unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("local_setup.bash")).unwrap(), "# setup");
        assert!(dst.join("lib/librcl.so.1").exists());
        #[cfg(unix)]
        assert_eq!(
            fs::read_link(dst.join("lib/librcl.so")).unwrap(),
            PathBuf::from("librcl.so.1")
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/ws/./pkg/../out")), PathBuf::from("/ws/out"));
        assert_eq!(normalize_path(Path::new("/ws/pkg/")), PathBuf::from("/ws/pkg"));
    }

    #[test]
    fn test_is_inside() {
        assert!(is_inside(Path::new("/recipes/core/_ws"), Path::new("/recipes/core")));
        assert!(is_inside(Path::new("/recipes/core"), Path::new("/recipes/core/.")));
        assert!(is_inside(Path::new("/recipes/core/pkg/.."), Path::new("/recipes/core")));
        assert!(!is_inside(Path::new("/recipes/core-extra"), Path::new("/recipes/core")));
    }

    #[test]
    fn test_is_contained_relative() {
        assert!(is_contained_relative(Path::new("src/ros2/rcl")));
        assert!(is_contained_relative(Path::new("./cmake/Find.cmake")));
        assert!(!is_contained_relative(Path::new("../../x")));
        assert!(!is_contained_relative(Path::new("src/../../x")));
        assert!(!is_contained_relative(Path::new("/etc/passwd")));
        assert!(!is_contained_relative(Path::new("")));
    }

    #[test]
    fn test_list_files_skips_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b"), "").unwrap();
        fs::write(tmp.path().join("a"), "").unwrap();

        let files = list_files(tmp.path()).unwrap();
        assert_eq!(files, vec![tmp.path().join("a"), tmp.path().join("b")]);
    }
}
