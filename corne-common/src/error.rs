// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Error taxonomy for the install pipeline.
//!
//! Every variant is fatal: the sequencer stops at the first error and the
//! operator re-runs the whole install once the cause is fixed. A tolerated
//! reboot error during flashing is a successful outcome, not an error, and
//! therefore has no variant here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::flash::FlashTarget;

pub type Result<T> = std::result::Result<T, InstallError>;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("missing prerequisite: {0}")]
    PrerequisiteMissing(String),

    #[error("checksum mismatch for {asset}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        asset: String,
        expected: String,
        actual: String,
    },

    #[error("no successful build of {repo} found on branch {branch}")]
    NoSuccessfulBuild { repo: String, branch: String },

    #[error("failed to download {what}: {message}")]
    DownloadFailed { what: String, message: String },

    #[error("firmware image(s) not found in {}: {}", .dir.display(), .missing.join(", "))]
    ImageNotFound { dir: PathBuf, missing: Vec<String> },

    #[error("flashing {target} failed: {output}")]
    FlashFailed { target: FlashTarget, output: String },

    #[error("aborted by operator before {0}")]
    Aborted(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
