// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Install configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::bundle::BundleLayout;
use crate::checksum::DigestMode;

pub const DEFAULT_REPO: &str = "jrhy/zmk-config-corne";
pub const DEFAULT_BRANCH: &str = "main";

/// strerror(EIO) as printed when the bootloader drops off mid-write.
pub const IO_ERROR_SIGNATURE: &str = "Input/output error";

/// Time a half needs to reboot after receiving an image.
pub const SETTLE_INTERVAL: Duration = Duration::from_secs(2);

/// Environment variable overriding the scratch directory root.
pub const SCRATCH_ENV: &str = "CORNE_FLASH_SCRATCH";

/// Environment variable overriding the I/O-error signature.
pub const IO_SIGNATURE_ENV: &str = "CORNE_FLASH_IO_SIGNATURE";

/// Mount point the nice!nano bootloader exposes.
pub const DEFAULT_DEVICE: &str = "/dev/disk/by-label/NICENANO";

pub const DEFAULT_INTERPRETER: &str = "python3";

/// Where the flashing script is published.
pub const DEFAULT_FLASH_TOOL_URL: &str =
    "https://raw.githubusercontent.com/jrhy/zmk-config-corne/main/scripts/flash_uf2.py";

/// SHA-256 of `scripts/flash_uf2.py` as published at [`DEFAULT_FLASH_TOOL_URL`].
pub const DEFAULT_FLASH_TOOL_SHA256: &str =
    "beac5a5ff03c755494d9e52beee164f435d305e6576f53f6a79a9746ba4c96d7";

/// The flashing script and where it comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashToolConfig {
    pub interpreter: String,
    pub path: Option<PathBuf>,
    pub source: Option<String>,
    pub sha256: Option<String>,
    pub device: PathBuf,
}

impl Default for FlashToolConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            path: None,
            source: Some(DEFAULT_FLASH_TOOL_URL.to_string()),
            sha256: Some(DEFAULT_FLASH_TOOL_SHA256.to_string()),
            device: PathBuf::from(DEFAULT_DEVICE),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallConfig {
    pub repo: String,
    pub branch: String,
    pub skip_reset: bool,
    pub scratch_root: PathBuf,
    pub layout: BundleLayout,
    pub flash_tool: FlashToolConfig,
    pub io_error_signature: String,
    pub settle: Duration,
    pub digest: DigestMode,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            skip_reset: false,
            scratch_root: std::env::temp_dir(),
            layout: BundleLayout::default(),
            flash_tool: FlashToolConfig::default(),
            io_error_signature: IO_ERROR_SIGNATURE.to_string(),
            settle: SETTLE_INTERVAL,
            digest: DigestMode::default(),
        }
    }
}

impl InstallConfig {
    /// External programs the run cannot start without.
    ///
    /// `curl` is only needed when the flash tool still has to be downloaded.
    pub fn required_programs(&self, tool_needs_fetch: bool) -> Vec<String> {
        let mut programs = vec!["gh".to_string(), self.flash_tool.interpreter.clone()];
        if tool_needs_fetch {
            programs.push("curl".to_string());
        }
        programs
    }
}
