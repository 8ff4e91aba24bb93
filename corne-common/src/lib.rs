// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Common types and logic for corne-flash.
//!
//! The install pipeline fetches a ZMK build from CI, checks the flashing
//! tool, and writes the images to both halves of a split keyboard. External
//! programs and the operator are reached through the [`CommandRunner`] and
//! [`Operator`] traits so the whole pipeline runs under test with fakes.

pub mod artifact;
pub mod bundle;
pub mod checksum;
pub mod config;
pub mod error;
pub mod flash;
pub mod install_fsm;
pub mod operator;
pub mod process;
pub mod sequencer;
pub mod tool;

// Re-export commonly used types
pub use bundle::{BundleLayout, FirmwareBundle, FirmwareImages, ImageKind};
pub use checksum::{ChecksumVerifier, DigestMode, VerifyResult};
pub use config::{FlashToolConfig, InstallConfig};
pub use error::{InstallError, Result};
pub use flash::{classify, FlashOperation, FlashOutcome, FlashTarget, FlashTool, Role};
pub use install_fsm::Stage;
pub use operator::Operator;
pub use process::{CapturedOutput, CommandRunner, Invocation, SystemRunner};
pub use sequencer::{InstallReport, Installer};
pub use tool::ToolAsset;
