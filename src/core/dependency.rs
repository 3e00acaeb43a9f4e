//! Already-packaged dependencies a recipe builds against.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the setup script a colcon install tree ships at its root.
pub const SETUP_SCRIPT: &str = "local_setup.bash";

/// A dependency as written in the recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDependency {
    pub name: String,
    pub path: PathBuf,
}

/// A dependency with its install root resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub root: PathBuf,
}

impl Dependency {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Dependency {
            name: name.into(),
            root: root.into(),
        }
    }

    /// The setup script path, whether or not it exists.
    pub fn setup_script(&self) -> PathBuf {
        self.root.join(SETUP_SCRIPT)
    }

    /// The setup script, only if the dependency ships one.
    pub fn existing_setup_script(&self) -> Option<PathBuf> {
        let script = self.setup_script();
        script.is_file().then_some(script)
    }

    /// Whether `path` is located under this dependency's root.
    ///
    /// Compared by path components, so `/opt/ros2` does not own
    /// `/opt/ros2-extra`.
    pub fn owns(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

/// `<root>/lib/<pythonX.Y>/site-packages`.
pub fn python_site_packages(root: &Path, python_version: &str) -> PathBuf {
    root.join("lib").join(python_version).join("site-packages")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owns_is_component_wise() {
        let dep = Dependency::new("ros2-core", "/opt/ros2");

        assert!(dep.owns(Path::new("/opt/ros2")));
        assert!(dep.owns(Path::new("/opt/ros2/lib")));
        assert!(!dep.owns(Path::new("/opt/ros2-extra/lib")));
        assert!(!dep.owns(Path::new("/usr/lib")));
    }

    #[test]
    fn test_python_site_packages() {
        assert_eq!(
            python_site_packages(Path::new("/opt/ros2"), "python3.8"),
            PathBuf::from("/opt/ros2/lib/python3.8/site-packages")
        );
    }
}
