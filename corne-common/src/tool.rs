// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Helper tools the installer needs on disk, such as the flashing script.

use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::process::{CommandRunner, Invocation};

/// File name used when the source URL does not end in one.
const FALLBACK_FILE_NAME: &str = "flash.py";

/// A tool file with its provenance and pinned digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolAsset {
    pub name: String,
    pub source: Option<String>,
    pub sha256: Option<String>,
    pub path: PathBuf,
}

impl ToolAsset {
    /// Build an asset from an existing local path, or from a source URL
    /// downloaded into `scratch`.
    pub fn resolve(
        name: &str,
        local: Option<&Path>,
        source: Option<&str>,
        sha256: Option<&str>,
        scratch: &Path,
    ) -> Result<Self> {
        let path = match (local, source) {
            (Some(local), None) => local.to_path_buf(),
            (Some(local), Some(_)) if local.is_file() => local.to_path_buf(),
            // Downloads always land in scratch, never on a caller-supplied path.
            (_, Some(url)) => scratch.join(file_name_from_url(url)),
            (None, None) => {
                return Err(InstallError::PrerequisiteMissing(format!(
                    "{}: no local path or source URL configured",
                    name
                )))
            }
        };

        Ok(Self {
            name: name.to_string(),
            source: source.map(str::to_string),
            sha256: sha256.map(str::to_string),
            path,
        })
    }

    pub fn is_present(&self) -> bool {
        self.path.is_file()
    }

    /// Whether acquiring this asset needs `curl`.
    pub fn needs_fetch(&self) -> bool {
        !self.is_present() && self.source.is_some()
    }

    /// Download the asset with `curl` unless it is already on disk.
    pub fn acquire<R: CommandRunner>(&self, runner: &R) -> Result<()> {
        if self.is_present() {
            log::debug!("{} already present at {}", self.name, self.path.display());
            return Ok(());
        }

        let url = self.source.as_deref().ok_or_else(|| {
            InstallError::PrerequisiteMissing(format!(
                "{} not found at {}",
                self.name,
                self.path.display()
            ))
        })?;

        log::info!("Fetching {} from {}", self.name, url);
        let invocation = Invocation::new("curl")
            .arg("--fail")
            .arg("--silent")
            .arg("--show-error")
            .arg("--location")
            .arg("--output")
            .arg(&self.path)
            .arg(url);

        let out = runner.run(&invocation).map_err(|e| InstallError::DownloadFailed {
            what: self.name.clone(),
            message: format!("failed to run curl: {}", e),
        })?;
        if !out.success() {
            return Err(InstallError::DownloadFailed {
                what: self.name.clone(),
                message: out.text.trim().to_string(),
            });
        }
        Ok(())
    }
}

fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => FALLBACK_FILE_NAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://example.com/tools/uf2flash.py?raw=1"),
            "uf2flash.py"
        );
        assert_eq!(file_name_from_url("https://example.com/"), FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_resolve_prefers_existing_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("flash.py");
        std::fs::write(&local, "print('flash')\n").unwrap();

        let asset = ToolAsset::resolve(
            "flash tool",
            Some(&local),
            Some("https://example.com/other.py"),
            None,
            &dir.path().join("scratch"),
        )
        .unwrap();
        assert_eq!(asset.path, local);
        assert!(!asset.needs_fetch());
    }

    #[test]
    fn test_resolve_missing_local_path_downloads_into_scratch() {
        let asset = ToolAsset::resolve(
            "flash tool",
            Some(Path::new("/opt/does-not-exist/flash.py")),
            Some("https://example.com/other.py"),
            None,
            Path::new("/tmp/scratch"),
        )
        .unwrap();
        assert_eq!(asset.path, PathBuf::from("/tmp/scratch/other.py"));
        assert!(asset.needs_fetch());
    }

    #[test]
    fn test_resolve_local_path_without_source_is_kept() {
        let asset = ToolAsset::resolve(
            "flash tool",
            Some(Path::new("/opt/does-not-exist/flash.py")),
            None,
            None,
            Path::new("/tmp/scratch"),
        )
        .unwrap();
        assert_eq!(asset.path, PathBuf::from("/opt/does-not-exist/flash.py"));
        assert!(!asset.is_present());
    }

    #[test]
    fn test_resolve_places_download_in_scratch() {
        let asset = ToolAsset::resolve(
            "flash tool",
            None,
            Some("https://example.com/uf2flash.py"),
            Some("abc"),
            Path::new("/tmp/scratch"),
        )
        .unwrap();
        assert_eq!(asset.path, PathBuf::from("/tmp/scratch/uf2flash.py"));
        assert!(asset.needs_fetch());
    }

    #[test]
    fn test_resolve_without_any_location_is_missing_prerequisite() {
        let err = ToolAsset::resolve("flash tool", None, None, None, Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, InstallError::PrerequisiteMissing(_)));
    }
}
