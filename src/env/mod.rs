//! Search-path bookkeeping for ROS 2 install trees.
//!
//! - `search_paths`: the tracked variables and their ordered lists
//! - `harvest`: sourcing dependency setup scripts and filtering the result
//! - `activate`: rendering the consolidated activation scripts

pub mod activate;
pub mod harvest;
pub mod search_paths;

pub use activate::ActivationScript;
pub use harvest::{harvest_dependencies, BashEnvSource, EnvSource};
pub use search_paths::{SearchPathVar, SearchPaths, PATH_LIST_SEPARATOR};
