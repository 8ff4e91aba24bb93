// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! SHA-256 verification of downloaded tools.
//!
//! Verification is advisory when no digest can be computed: the result is
//! [`VerifyResult::Skipped`] and a warning is logged. A mismatch is always
//! fatal to the caller.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{InstallError, Result};
use crate::process::{CommandRunner, Invocation};

/// How digests are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestMode {
    /// In-process SHA-256.
    #[default]
    Builtin,
    /// `sha256sum` or `shasum -a 256` from `PATH`, when installed.
    System,
    /// Never compute digests.
    Off,
}

impl fmt::Display for DigestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestMode::Builtin => f.write_str("builtin"),
            DigestMode::System => f.write_str("system"),
            DigestMode::Off => f.write_str("off"),
        }
    }
}

impl FromStr for DigestMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "builtin" => Ok(DigestMode::Builtin),
            "system" => Ok(DigestMode::System),
            "off" => Ok(DigestMode::Off),
            other => Err(format!(
                "unknown digest mode '{}' (expected builtin, system or off)",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyResult {
    Verified,
    Skipped,
    Mismatch { expected: String, actual: String },
}

impl VerifyResult {
    /// Turn a mismatch into the fatal error for `asset`.
    pub fn into_result(self, asset: &str) -> Result<VerifyResult> {
        match self {
            VerifyResult::Mismatch { expected, actual } => Err(InstallError::ChecksumMismatch {
                asset: asset.to_string(),
                expected,
                actual,
            }),
            other => Ok(other),
        }
    }
}

pub struct ChecksumVerifier<'a, R> {
    runner: &'a R,
    mode: DigestMode,
}

impl<'a, R: CommandRunner> ChecksumVerifier<'a, R> {
    pub fn new(runner: &'a R, mode: DigestMode) -> Self {
        Self { runner, mode }
    }

    /// Compare the SHA-256 of `path` against `expected` (lower-case hex,
    /// compared case-sensitively).
    pub fn verify(&self, path: &Path, expected: &str, label: &str) -> Result<VerifyResult> {
        let actual = match self.digest(path)? {
            Some(actual) => actual,
            None => {
                log::warn!(
                    "No SHA-256 implementation available ({} digest mode); skipping integrity check of {}",
                    self.mode,
                    label
                );
                return Ok(VerifyResult::Skipped);
            }
        };

        if actual == expected {
            log::info!("{}: checksum OK ({})", label, actual);
            Ok(VerifyResult::Verified)
        } else {
            log::error!("{}: checksum mismatch, expected {}, got {}", label, expected, actual);
            Ok(VerifyResult::Mismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }

    fn digest(&self, path: &Path) -> Result<Option<String>> {
        match self.mode {
            DigestMode::Off => Ok(None),
            DigestMode::Builtin => sha256_file(path)
                .map(Some)
                .map_err(|e| InstallError::io(format!("failed to read {}", path.display()), e)),
            DigestMode::System => Ok(self.system_digest(path)),
        }
    }

    fn system_digest(&self, path: &Path) -> Option<String> {
        let invocation = if self.runner.locate("sha256sum").is_some() {
            Invocation::new("sha256sum").arg(path)
        } else if self.runner.locate("shasum").is_some() {
            Invocation::new("shasum").arg("-a").arg("256").arg(path)
        } else {
            return None;
        };

        match self.runner.run(&invocation) {
            Ok(out) if out.success() => out.text.split_whitespace().next().map(str::to_string),
            Ok(out) => {
                log::warn!("{} failed: {}", invocation.program, out.text.trim());
                None
            }
            Err(e) => {
                log::warn!("failed to run {}: {}", invocation.program, e);
                None
            }
        }
    }
}

/// Lower-case hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
