//! High-level operations.
//!
//! This module contains the implementation of rosdock commands.

pub mod doctor;
pub mod project;
pub mod rosdock_build;
pub mod rosdock_clean;
pub mod rosdock_create;
pub mod rosdock_env;
pub mod rosdock_package;
pub mod rosdock_source;

pub use doctor::{doctor, format_report, CheckResult, DoctorReport};
pub use project::Project;
pub use rosdock_build::{build, build_with_paths, BuildOptions, BuildResult};
pub use rosdock_clean::clean;
pub use rosdock_create::{create, CreateOptions};
pub use rosdock_env::{env, EnvFormat, EnvOptions, EnvResult};
pub use rosdock_package::{
    package, package_with_interpreter, PackageMetadata, PackageOptions, PackageResult,
    PACKAGE_METADATA_FILE,
};
pub use rosdock_source::{fetch_manifest, source, ManifestLocation, SourceOptions};
