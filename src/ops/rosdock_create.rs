//! Implementation of `rosdock create`: source, build and package in one go.

use anyhow::Result;

use crate::ops::rosdock_build::{build, BuildOptions};
use crate::ops::rosdock_package::{package_with_interpreter, PackageResult};
use crate::ops::rosdock_source::{source, SourceOptions};
use crate::ops::Project;

#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub source: SourceOptions,
    pub build: BuildOptions,
    pub keep_workspace: bool,
}

/// Run the whole pipeline. Any failing step stops the rest.
pub fn create(project: &Project, opts: &CreateOptions) -> Result<PackageResult> {
    project.checked_package_dir()?;
    source(project, &opts.source)?;
    let built = build(project, &opts.build)?;
    package_with_interpreter(project, &built.interpreter, opts.keep_workspace)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::Recipe;
    use crate::util::config::Config;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn script(path: &Path, body: &str) -> PathBuf {
        std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_path_buf()
    }

    #[test]
    fn test_create_runs_every_step() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = tmp.path().join("Rosdock.toml");
        std::fs::write(
            &recipe_path,
            "[package]\nname = \"ros2-core\"\nversion = \"foxy\"\n\n[source]\nurl = \"ros2.repos\"\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("ros2.repos"), "repositories: {}\n").unwrap();

        let vcs = script(&tmp.path().join("vcs"), "mkdir -p \"$2/ros2/rcl\"");
        let python = script(
            &tmp.path().join("python3"),
            "echo /build/py/bin/python3\necho python3.8",
        );
        // Produces a merged install tree with one entry-point script
        let colcon = script(
            &tmp.path().join("colcon"),
            "mkdir -p install/bin\nprintf '#!/usr/bin/python3\\n' > install/bin/ros2",
        );

        let opts = CreateOptions {
            source: SourceOptions { vcs },
            build: BuildOptions {
                colcon,
                python,
                ..BuildOptions::default()
            },
            keep_workspace: false,
        };
        let project = Project::new(Recipe::load(&recipe_path).unwrap(), Config::default());

        let result = create(&project, &opts).unwrap();

        assert_eq!(
            std::fs::read_to_string(result.package_dir.join("bin/ros2")).unwrap(),
            "#!/usr/bin/env python3.8\n"
        );
        assert!(!tmp.path().join("_ws").exists());
    }

    #[test]
    fn test_create_stops_on_source_failure() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = tmp.path().join("Rosdock.toml");
        std::fs::write(
            &recipe_path,
            "[package]\nname = \"ros2-core\"\nversion = \"foxy\"\n\n[source]\nurl = \"missing.repos\"\n",
        )
        .unwrap();

        let opts = CreateOptions {
            source: SourceOptions {
                vcs: PathBuf::from("vcs"),
            },
            build: BuildOptions::default(),
            keep_workspace: false,
        };
        let project = Project::new(Recipe::load(&recipe_path).unwrap(), Config::default());

        assert!(create(&project, &opts).is_err());
        assert!(!tmp.path().join("package").exists());
    }

    #[test]
    fn test_create_rejects_package_dir_before_sourcing() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = tmp.path().join("Rosdock.toml");
        std::fs::write(
            &recipe_path,
            "[package]\nname = \"ros2-core\"\nversion = \"foxy\"\n\n[source]\nurl = \"ros2.repos\"\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("ros2.repos"), "repositories: {}\n").unwrap();
        let marker = tmp.path().join("vcs-ran");
        let vcs = script(&tmp.path().join("vcs"), &format!("touch '{}'", marker.display()));

        let mut config = Config::default();
        config.build.package_dir = Some(PathBuf::from("."));
        let project = Project::new(Recipe::load(&recipe_path).unwrap(), config);
        let opts = CreateOptions {
            source: SourceOptions { vcs },
            build: BuildOptions::default(),
            keep_workspace: false,
        };

        assert!(create(&project, &opts).is_err());
        assert!(!marker.exists());
        assert!(!tmp.path().join("_ws").exists());
        assert!(recipe_path.is_file());
    }
}
