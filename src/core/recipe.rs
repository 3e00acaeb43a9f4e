//! Rosdock.toml recipe parsing and schema.
//!
//! A recipe describes one ROS 2 package: where its `.repos` manifest lives,
//! which CMake arguments to pass through colcon, which workspace packages to
//! skip, and which already-packaged dependencies it builds against.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::dependency::{Dependency, RawDependency};
use crate::core::errors::RecipeError;
use crate::util::fs::{absolutize, normalize_path};

/// Recipe file name.
pub const RECIPE_FILE: &str = "Rosdock.toml";

/// Default ignore list file, looked up next to the recipe.
pub const DEFAULT_IGNORE_LIST: &str = "ignore_list";

/// Package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    pub name: String,

    /// Distribution-style version (e.g. `foxy`); not required to be semver.
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub license: Option<String>,
}

/// Where the repository manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// `http(s)://` or `file://` URL, or a path relative to the recipe.
    pub url: String,

    /// Expected SHA256 of the fetched manifest.
    #[serde(default)]
    pub sha256: Option<String>,
}

/// A file copied over a workspace file before building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOverride {
    /// Source file, relative to the recipe directory.
    pub from: PathBuf,

    /// Destination, relative to the workspace directory.
    pub to: PathBuf,
}

/// Build settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSpec {
    #[serde(default)]
    pub cmake_args: Vec<String>,

    #[serde(default)]
    pub ignore_list: Option<PathBuf>,

    #[serde(default)]
    pub overrides: Vec<FileOverride>,
}

/// Explicit package options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Options {
    /// Must match the detected interpreter when set.
    #[serde(default)]
    pub python_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    package: PackageMeta,
    source: SourceSpec,
    #[serde(default)]
    build: BuildSpec,
    #[serde(default)]
    options: Options,
    #[serde(default)]
    dependencies: Vec<RawDependency>,
}

/// A loaded recipe with paths resolved against its directory.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub package: PackageMeta,
    pub source: SourceSpec,
    pub build: BuildSpec,
    pub options: Options,
    pub dependencies: Vec<Dependency>,
    recipe_dir: PathBuf,
}

impl Recipe {
    /// Load a recipe from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse recipe content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawRecipe = toml::from_str(content).map_err(|e| RecipeError::InvalidRecipe {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // A bare file name has an empty parent
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let recipe_dir = if parent.is_absolute() {
            parent.to_path_buf()
        } else {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            normalize_path(&cwd.join(parent))
        };

        if raw.package.name.trim().is_empty() {
            return Err(RecipeError::InvalidRecipe {
                path: path.to_path_buf(),
                message: "package.name must not be empty".to_string(),
            }
            .into());
        }

        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for dep in raw.dependencies {
            if dependencies.iter().any(|d: &Dependency| d.name == dep.name) {
                return Err(RecipeError::InvalidRecipe {
                    path: path.to_path_buf(),
                    message: format!("dependency `{}` declared twice", dep.name),
                }
                .into());
            }
            dependencies.push(Dependency::new(dep.name, absolutize(&recipe_dir, &dep.path)));
        }

        Ok(Recipe {
            package: raw.package,
            source: raw.source,
            build: raw.build,
            options: raw.options,
            dependencies,
            recipe_dir,
        })
    }

    /// Directory containing the recipe file.
    pub fn recipe_dir(&self) -> &Path {
        &self.recipe_dir
    }

    pub fn name(&self) -> &str {
        &self.package.name
    }

    pub fn version(&self) -> &str {
        &self.package.version
    }

    /// Path of the ignore list, if one applies.
    ///
    /// An explicitly configured list is always returned; the default
    /// `ignore_list` is only returned when it exists.
    pub fn ignore_list_path(&self) -> Option<PathBuf> {
        match self.build.ignore_list {
            Some(ref p) => Some(absolutize(&self.recipe_dir, p)),
            None => {
                let default = self.recipe_dir.join(DEFAULT_IGNORE_LIST);
                default.is_file().then_some(default)
            }
        }
    }

    /// Source location of a file override, resolved against the recipe.
    pub fn override_source(&self, o: &FileOverride) -> PathBuf {
        absolutize(&self.recipe_dir, &o.from)
    }
}

/// Find `Rosdock.toml` starting from `start` and searching upward.
pub fn find_recipe(start: &Path) -> Result<PathBuf, RecipeError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(RECIPE_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(RecipeError::RecipeNotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}
