//! A recipe together with the configuration it is built under.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{Recipe, RecipeError, Workspace};
use crate::util::config::Config;
use crate::util::fs::{absolutize, is_inside};
use crate::util::GlobalContext;

/// The unit every pipeline operation works on.
#[derive(Debug, Clone)]
pub struct Project {
    recipe: Recipe,
    config: Config,
}

impl Project {
    /// Find the recipe from the context's working directory and load the
    /// merged configuration next to it.
    pub fn load(ctx: &GlobalContext) -> Result<Self> {
        let path = ctx.find_recipe()?;
        let recipe = Recipe::load(&path)?;
        let config = ctx.config_for(recipe.recipe_dir());
        tracing::debug!("loaded recipe {} from {}", recipe.name(), path.display());
        Ok(Project { recipe, config })
    }

    pub fn new(recipe: Recipe, config: Config) -> Self {
        Project { recipe, config }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn recipe_dir(&self) -> &Path {
        self.recipe.recipe_dir()
    }

    /// The workspace, resolved against the recipe directory.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(absolutize(
            self.recipe_dir(),
            &self.config.build.workspace_dir(),
        ))
    }

    /// Where the install tree is copied on packaging.
    pub fn package_dir(&self) -> PathBuf {
        absolutize(self.recipe_dir(), &self.config.build.package_dir())
    }

    /// The package directory, rejected when emptying it would destroy the
    /// recipe directory or the workspace.
    pub fn checked_package_dir(&self) -> Result<PathBuf, RecipeError> {
        let package_dir = self.package_dir();
        let overlap = |what: &'static str, other: &Path| RecipeError::PackageDirOverlap {
            path: package_dir.clone(),
            what,
            other: other.to_path_buf(),
        };

        if is_inside(self.recipe_dir(), &package_dir) {
            return Err(overlap("the recipe directory", self.recipe_dir()));
        }
        let ws = self.workspace();
        if is_inside(&package_dir, ws.root()) || is_inside(ws.root(), &package_dir) {
            return Err(overlap("the workspace", ws.root()));
        }
        Ok(package_dir)
    }

    /// The configured toolchain file, resolved against the recipe directory.
    pub fn toolchain_file(&self) -> Option<PathBuf> {
        self.config
            .build
            .toolchain_file
            .as_ref()
            .map(|p| absolutize(self.recipe_dir(), p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPE: &str = "[package]\nname = \"ros2-tf\"\nversion = \"foxy\"\n\n[source]\nurl = \"ros2.repos\"\n";

    fn project(config: Config) -> Project {
        let recipe = Recipe::parse(RECIPE, Path::new("/recipes/tf/Rosdock.toml")).unwrap();
        Project::new(recipe, config)
    }

    #[test]
    fn test_default_layout() {
        let project = project(Config::default());
        assert_eq!(project.workspace().root(), Path::new("/recipes/tf/_ws"));
        assert_eq!(project.package_dir(), PathBuf::from("/recipes/tf/package"));
        assert!(project.toolchain_file().is_none());
    }

    #[test]
    fn test_configured_layout() {
        let mut config = Config::default();
        config.build.workspace_dir = Some(PathBuf::from("/tmp/ws"));
        config.build.toolchain_file = Some(PathBuf::from("../base/generic_linux.cmake"));

        let project = project(config);
        assert_eq!(project.workspace().root(), Path::new("/tmp/ws"));
        assert_eq!(
            project.toolchain_file(),
            Some(PathBuf::from("/recipes/tf/../base/generic_linux.cmake"))
        );
    }

    fn with_package_dir(dir: &str) -> Project {
        let mut config = Config::default();
        config.build.package_dir = Some(PathBuf::from(dir));
        project(config)
    }

    #[test]
    fn test_checked_package_dir_accepts_sibling_output() {
        assert_eq!(
            with_package_dir("package").checked_package_dir().unwrap(),
            PathBuf::from("/recipes/tf/package")
        );
        assert!(with_package_dir("/out/tf").checked_package_dir().is_ok());
        assert!(with_package_dir("../tf-package").checked_package_dir().is_ok());
    }

    #[test]
    fn test_checked_package_dir_rejects_recipe_and_workspace() {
        for dir in [".", "..", "/", "/recipes/tf/", "_ws", "_ws/install", "sub/../_ws"] {
            let err = with_package_dir(dir).checked_package_dir().unwrap_err();
            assert!(
                matches!(err, RecipeError::PackageDirOverlap { .. }),
                "{} should be rejected",
                dir
            );
        }
    }

    #[test]
    fn test_checked_package_dir_rejects_parent_of_workspace() {
        let mut config = Config::default();
        config.build.workspace_dir = Some(PathBuf::from("/scratch/build/_ws"));
        config.build.package_dir = Some(PathBuf::from("/scratch/build"));

        let err = project(config).checked_package_dir().unwrap_err();
        assert!(err.to_string().contains("the workspace"));
    }
}
