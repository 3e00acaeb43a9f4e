//! rosdock - packaging for ROS 2 colcon workspaces
//!
//! This crate drives `vcs`, `colcon` and `bash` to turn a recipe into a
//! relocatable install tree, and consolidates the runtime search paths of
//! packaged dependencies into a single activation script.

pub mod builder;
pub mod core;
pub mod env;
pub mod ops;
pub mod util;

pub use core::{Dependency, Recipe, RecipeError, Workspace};
pub use env::{SearchPathVar, SearchPaths};
pub use util::context::GlobalContext;
