//! Core data types: recipes, dependencies and the colcon workspace.

pub mod dependency;
pub mod errors;
pub mod ignore;
pub mod recipe;
pub mod workspace;

pub use dependency::Dependency;
pub use errors::RecipeError;
pub use recipe::Recipe;
pub use workspace::Workspace;
