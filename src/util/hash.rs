//! Hashing utilities for verifying fetched repository manifests.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::core::errors::RecipeError;

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check that `path` hashes to `expected` (case-insensitive hex).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(RecipeError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.trim().to_string(),
            actual,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_sha256_bytes() {
        assert_eq!(sha256_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn test_verify_sha256() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ros2.repos");
        std::fs::write(&path, "").unwrap();

        verify_sha256(&path, &EMPTY_SHA256.to_uppercase()).unwrap();

        let err = verify_sha256(&path, "deadbeef").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecipeError>(),
            Some(RecipeError::ChecksumMismatch { .. })
        ));
    }
}
