//! Configuration error types.
//!
//! These are the errors that stop a packaging run before any external tool
//! is invoked. Tool failures are reported through `anyhow` with the failing
//! command line attached.

use std::path::PathBuf;

use thiserror::Error;

/// A configuration error detected while preparing a packaging step.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("repository manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("no Rosdock.toml found in {} or any parent directory", dir.display())]
    RecipeNotFound { dir: PathBuf },

    #[error("invalid recipe {}: {message}", path.display())]
    InvalidRecipe { path: PathBuf, message: String },

    #[error(
        "python version `{requested}` conflicts with the detected interpreter `{detected}`; \
         do not set it, it is detected automatically"
    )]
    PythonVersionConflict { requested: String, detected: String },

    #[error("override source not found: {}", path.display())]
    OverrideSourceMissing { path: PathBuf },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid override target `{}`: must be a relative path inside the workspace", to.display())]
    InvalidOverrideTarget { to: PathBuf },

    #[error(
        "package directory {} overlaps {what} {}; choose a separate output directory",
        path.display(),
        other.display()
    )]
    PackageDirOverlap {
        path: PathBuf,
        what: &'static str,
        other: PathBuf,
    },

    #[error("invalid ignore entry `{entry}`: must be a relative path inside the workspace")]
    InvalidIgnoreEntry { entry: String },
}
