//! Implementation of `rosdock source`.
//!
//! Prepares an empty workspace, fetches the repository manifest into it and
//! imports every listed repository with `vcs`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use url::Url;

use crate::core::errors::RecipeError;
use crate::core::recipe::SourceSpec;
use crate::core::Workspace;
use crate::ops::Project;
use crate::util::fs::{absolutize, ensure_dir};
use crate::util::hash::verify_sha256;

/// Options for the source step.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// `vcs` executable
    pub vcs: PathBuf,
}

/// Where a manifest is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLocation {
    Remote(Url),
    Local(PathBuf),
}

impl ManifestLocation {
    /// Classify a `[source] url` value.
    ///
    /// `http(s)://` URLs are downloaded, `file://` URLs and plain paths are
    /// copied. Relative paths resolve against `base`.
    pub fn parse(url: &str, base: &Path) -> Result<Self> {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                Ok(ManifestLocation::Remote(parsed))
            }
            Ok(parsed) if parsed.scheme() == "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| anyhow::anyhow!("invalid file URL: {}", url))?;
                Ok(ManifestLocation::Local(path))
            }
            // Single-letter schemes are Windows drive letters
            Ok(parsed) if parsed.scheme().len() > 1 => {
                bail!("unsupported manifest URL scheme `{}`: {}", parsed.scheme(), url)
            }
            _ => Ok(ManifestLocation::Local(absolutize(base, Path::new(url)))),
        }
    }
}

/// Fetch the manifest described by `source` to `dest`.
pub fn fetch_manifest(source: &SourceSpec, recipe_dir: &Path, dest: &Path) -> Result<()> {
    match ManifestLocation::parse(&source.url, recipe_dir)? {
        ManifestLocation::Remote(url) => download(&url, dest)?,
        ManifestLocation::Local(path) => {
            if !path.is_file() {
                return Err(RecipeError::ManifestNotFound { path }.into());
            }
            tracing::debug!("copying manifest from {}", path.display());
            std::fs::copy(&path, dest).with_context(|| {
                format!(
                    "failed to copy manifest {} to {}",
                    path.display(),
                    dest.display()
                )
            })?;
        }
    }

    if let Some(ref expected) = source.sha256 {
        verify_sha256(dest, expected)?;
        tracing::debug!("manifest checksum verified");
    }

    Ok(())
}

fn download(url: &Url, dest: &Path) -> Result<()> {
    tracing::info!("Fetching manifest from {}", url);

    let response = reqwest::blocking::get(url.as_str())
        .with_context(|| format!("failed to download manifest from {}", url))?;

    if !response.status().is_success() {
        bail!(
            "failed to download manifest from {}: HTTP {}",
            url,
            response.status()
        );
    }

    let body = response
        .bytes()
        .with_context(|| "failed to read manifest response body")?;

    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(dest, &body)
        .with_context(|| format!("failed to write manifest: {}", dest.display()))
}

/// Run the source step: clean workspace, fetch manifest, import (strict).
pub fn source(project: &Project, opts: &SourceOptions) -> Result<Workspace> {
    let ws = project.workspace();
    ws.clean()?;

    let manifest = ws.manifest_path();
    fetch_manifest(&project.recipe().source, project.recipe_dir(), &manifest)?;

    ws.import_repositories(&opts.vcs, &manifest, true)?;

    Ok(ws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Recipe;
    use crate::util::config::Config;
    use crate::util::hash::sha256_bytes;
    use tempfile::TempDir;

    const MANIFEST: &str = "repositories:\n  ros2/rcl:\n    type: git\n";

    #[test]
    fn test_location_parse() {
        let base = Path::new("/recipes/core");
        assert_eq!(
            ManifestLocation::parse("https://example.com/ros2.repos", base).unwrap(),
            ManifestLocation::Remote(Url::parse("https://example.com/ros2.repos").unwrap())
        );
        assert_eq!(
            ManifestLocation::parse("ros2.repos", base).unwrap(),
            ManifestLocation::Local(PathBuf::from("/recipes/core/ros2.repos"))
        );
        assert!(ManifestLocation::parse("ftp://example.com/ros2.repos", base).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_location_parse_file_url() {
        assert_eq!(
            ManifestLocation::parse("file:///srv/ros2.repos", Path::new("/")).unwrap(),
            ManifestLocation::Local(PathBuf::from("/srv/ros2.repos"))
        );
    }

    #[test]
    fn test_fetch_local_with_checksum() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("ros2.repos"), MANIFEST).unwrap();
        let dest = tmp.path().join("fetched.repos");

        let spec = SourceSpec {
            url: "ros2.repos".to_string(),
            sha256: Some(sha256_bytes(MANIFEST.as_bytes())),
        };
        fetch_manifest(&spec, tmp.path(), &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), MANIFEST);
    }

    /// Serve `body` once over HTTP on a loopback port and return its URL.
    fn serve_once(body: &'static [u8]) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(header.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
        });
        format!("http://{}/ros2.repos", addr)
    }

    #[test]
    fn test_fetch_remote_keeps_raw_bytes() {
        // Latin-1 comment: not valid UTF-8
        const BODY: &[u8] = b"repositories:\n  ros2/rcl: {}  # caf\xe9\n";
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("_ws/ros2.repos");

        let spec = SourceSpec {
            url: serve_once(BODY),
            sha256: Some(sha256_bytes(BODY)),
        };
        fetch_manifest(&spec, tmp.path(), &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), BODY);
    }

    #[test]
    fn test_fetch_checksum_mismatch() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("ros2.repos"), MANIFEST).unwrap();

        let spec = SourceSpec {
            url: "ros2.repos".to_string(),
            sha256: Some("00".repeat(32)),
        };
        let err = fetch_manifest(&spec, tmp.path(), &tmp.path().join("out.repos")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecipeError>(),
            Some(RecipeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_fetch_missing_local_manifest() {
        let tmp = TempDir::new().unwrap();
        let spec = SourceSpec {
            url: "missing.repos".to_string(),
            sha256: None,
        };
        let err = fetch_manifest(&spec, tmp.path(), &tmp.path().join("out.repos")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecipeError>(),
            Some(RecipeError::ManifestNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_source_cleans_fetches_and_imports() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let recipe_path = tmp.path().join("Rosdock.toml");
        std::fs::write(
            &recipe_path,
            "[package]\nname = \"ros2-core\"\nversion = \"foxy\"\n\n[source]\nurl = \"ros2.repos\"\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("ros2.repos"), MANIFEST).unwrap();

        let stale = tmp.path().join("_ws/stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        let vcs = tmp.path().join("vcs");
        std::fs::write(&vcs, "#!/bin/sh\ncat > \"$2/imported.repos\"\n").unwrap();
        std::fs::set_permissions(&vcs, std::fs::Permissions::from_mode(0o755)).unwrap();

        let project = Project::new(Recipe::load(&recipe_path).unwrap(), Config::default());
        let ws = source(&project, &SourceOptions { vcs }).unwrap();

        assert!(!stale.exists());
        assert_eq!(
            std::fs::read_to_string(ws.source_dir().join("imported.repos")).unwrap(),
            MANIFEST
        );
    }
}
