//! Building and post-processing a colcon workspace.

pub mod colcon;
pub mod cross;
pub mod shebang;

pub use colcon::{cmake_args_flag, ColconBuilder};
pub use cross::CrossToolchain;
pub use shebang::{fix_shebangs, ShebangFixer};
