// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Firmware bundle layout and image lookup.
//!
//! A ZMK build produces one UF2 per half plus a settings-reset image. Names
//! are fixed by the board and shield, so lookup is by exact filename only.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};

/// The three images a bundle must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Left,
    Right,
    Reset,
}

pub const IMAGE_KINDS: [ImageKind; 3] = [ImageKind::Left, ImageKind::Right, ImageKind::Reset];

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::Left => f.write_str("left"),
            ImageKind::Right => f.write_str("right"),
            ImageKind::Reset => f.write_str("reset"),
        }
    }
}

/// Naming scheme of the build output:
/// `<shield>_<side>-<board>@<version>-<firmware>.uf2` and
/// `settings_reset-<board>@<version>-<firmware>.uf2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleLayout {
    pub shield: String,
    pub board: String,
    pub board_version: String,
    pub firmware: String,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            shield: "corne".to_string(),
            board: "nice_nano".to_string(),
            board_version: "2.0.0".to_string(),
            firmware: "zmk".to_string(),
        }
    }
}

impl BundleLayout {
    /// Image file name for `kind`; an empty shield yields bare `left`/`right` prefixes.
    pub fn file_name(&self, kind: ImageKind) -> String {
        let side = match kind {
            ImageKind::Left => "left",
            ImageKind::Right => "right",
            ImageKind::Reset => "settings_reset",
        };
        let prefix = match kind {
            ImageKind::Reset => side.to_string(),
            _ if self.shield.is_empty() => side.to_string(),
            _ => format!("{}_{}", self.shield, side),
        };
        format!(
            "{}-{}@{}-{}.uf2",
            prefix, self.board, self.board_version, self.firmware
        )
    }
}

/// A downloaded build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirmwareBundle {
    pub repo: String,
    pub branch: String,
    pub run_id: u64,
    pub dir: PathBuf,
}

/// Paths of the three images inside a bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirmwareImages {
    pub left: PathBuf,
    pub right: PathBuf,
    pub reset: PathBuf,
}

impl FirmwareImages {
    pub fn path(&self, kind: ImageKind) -> &Path {
        match kind {
            ImageKind::Left => &self.left,
            ImageKind::Right => &self.right,
            ImageKind::Reset => &self.reset,
        }
    }
}

/// Find all three images in `dir`.
///
/// Artifact downloads land either flat in `dir` or one directory per
/// artifact, so each name is looked up in `dir` first and then in its
/// immediate sub-directories (sorted, first hit wins). Every missing name is
/// reported, not just the first.
pub fn locate_images(dir: &Path, layout: &BundleLayout) -> Result<FirmwareImages> {
    let subdirs = subdirectories(dir)?;

    let mut found = Vec::with_capacity(IMAGE_KINDS.len());
    let mut missing = Vec::new();
    for kind in IMAGE_KINDS {
        let name = layout.file_name(kind);
        match find_exact(dir, &subdirs, &name) {
            Some(path) => found.push(path),
            None => missing.push(name),
        }
    }

    match <[PathBuf; 3]>::try_from(found) {
        Ok([left, right, reset]) => Ok(FirmwareImages { left, right, reset }),
        Err(_) => Err(InstallError::ImageNotFound {
            dir: dir.to_path_buf(),
            missing,
        }),
    }
}

fn find_exact(dir: &Path, subdirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    std::iter::once(dir)
        .chain(subdirs.iter().map(PathBuf::as_path))
        .map(|d| d.join(name))
        .find(|candidate| candidate.is_file())
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| InstallError::io(format!("failed to read {}", dir.display()), e))?;

    let mut subdirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    Ok(subdirs)
}
