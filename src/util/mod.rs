//! Shared utilities

pub mod config;
pub mod context;
pub mod fs;
pub mod hash;
pub mod process;
pub mod python;
pub mod shell;

pub use config::Config;
pub use context::GlobalContext;
pub use python::PythonInterpreter;
pub use shell::Shell;
