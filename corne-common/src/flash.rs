// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Writing one firmware image to one keyboard half.
//!
//! The bootloader reboots into the new image as soon as it has received it,
//! which severs the storage handle the flashing tool is still holding. The
//! tool then reports an I/O error even though the write succeeded. This
//! module tells that case apart from a real failure:
//!
//! 1. The operator puts the half into bootloader mode and acknowledges.
//! 2. The tool runs exactly once; its combined output is captured.
//! 3. Output containing the I/O-error signature is a tolerated reboot.
//! 4. Otherwise the exit status decides between success and failure.
//! 5. The device gets a settle interval before anything else touches it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bundle::ImageKind;
use crate::error::{InstallError, Result};
use crate::operator::Operator;
use crate::process::{CapturedOutput, CommandRunner, Invocation};

/// Which keyboard half a write addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Left,
    Right,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Left => f.write_str("LEFT"),
            Role::Right => f.write_str("RIGHT"),
        }
    }
}

/// One image destined for one half.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashTarget {
    pub role: Role,
    pub kind: ImageKind,
    pub image: PathBuf,
}

impl FlashTarget {
    pub fn new(role: Role, kind: ImageKind, image: impl Into<PathBuf>) -> Self {
        Self {
            role,
            kind,
            image: image.into(),
        }
    }

    pub fn is_reset(&self) -> bool {
        self.kind == ImageKind::Reset
    }
}

impl fmt::Display for FlashTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reset() {
            write!(f, "{} (settings reset)", self.role)
        } else {
            write!(f, "{}", self.role)
        }
    }
}

/// Result of a single flash attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlashOutcome {
    Success,
    /// The device dropped off mid-write because it rebooted into the image.
    ToleratedRebootError,
    Failure(String),
}

impl FlashOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, FlashOutcome::Failure(_))
    }
}

/// Classify captured tool output.
///
/// The I/O-error signature wins over the exit status: a severed handle is
/// how a successful write looks from the tool's side.
pub fn classify(output: &CapturedOutput, io_error_signature: &str) -> FlashOutcome {
    if !io_error_signature.is_empty() && output.text.contains(io_error_signature) {
        FlashOutcome::ToleratedRebootError
    } else if output.success() {
        FlashOutcome::Success
    } else {
        FlashOutcome::Failure(failure_text(output))
    }
}

fn failure_text(output: &CapturedOutput) -> String {
    let text = output.text.trim();
    match (text.is_empty(), output.code) {
        (false, _) => text.to_string(),
        (true, Some(code)) => format!("exit status {}", code),
        (true, None) => "terminated by signal".to_string(),
    }
}

/// The external flashing utility and the storage target it writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashTool {
    pub interpreter: String,
    pub script: PathBuf,
    pub device: PathBuf,
}

impl FlashTool {
    /// `<interpreter> <script> write --device <device> <image>`
    pub fn invocation(&self, image: &Path) -> Invocation {
        Invocation::new(&self.interpreter)
            .arg(&self.script)
            .arg("write")
            .arg("--device")
            .arg(&self.device)
            .arg(image)
    }
}

/// Drives the gated, single-shot write protocol for one target.
pub struct FlashOperation<'a, R, O> {
    runner: &'a R,
    operator: &'a O,
    tool: &'a FlashTool,
    io_error_signature: &'a str,
    settle: Duration,
}

impl<'a, R: CommandRunner, O: Operator> FlashOperation<'a, R, O> {
    pub fn new(
        runner: &'a R,
        operator: &'a O,
        tool: &'a FlashTool,
        io_error_signature: &'a str,
        settle: Duration,
    ) -> Self {
        Self {
            runner,
            operator,
            tool,
            io_error_signature,
            settle,
        }
    }

    /// Flash `target` and report how it went.
    ///
    /// `Err` only when the operator declines the bootloader prompt or the
    /// prompt itself cannot be read; tool failures come back as
    /// [`FlashOutcome::Failure`].
    pub fn flash(&self, target: &FlashTarget) -> Result<FlashOutcome> {
        let prompt = bootloader_prompt(target);
        let ready = self
            .operator
            .acknowledge(&prompt)
            .map_err(|e| InstallError::io("failed to read operator confirmation", e))?;
        if !ready {
            return Err(InstallError::Aborted(format!("flashing {}", target)));
        }

        let invocation = self.tool.invocation(&target.image);
        log::info!("Flashing {} with {}", target, target.image.display());
        self.operator
            .begin(&format!("Writing {} to {}...", file_name(&target.image), target));

        let outcome = match self.runner.run(&invocation) {
            Ok(output) => classify(&output, self.io_error_signature),
            Err(e) => FlashOutcome::Failure(format!("failed to run {}: {}", invocation, e)),
        };

        match &outcome {
            FlashOutcome::Success => self.operator.end(&format!("{} flashed", target)),
            FlashOutcome::ToleratedRebootError => {
                log::debug!("{}: device rebooted during write, treating as success", target);
                self.operator
                    .end(&format!("{} flashed (device rebooted)", target));
            }
            FlashOutcome::Failure(text) => {
                log::error!("{}: flash failed: {}", target, text);
                self.operator.end(&format!("{} failed", target));
            }
        }

        self.operator.settle(self.settle);
        Ok(outcome)
    }
}

fn bootloader_prompt(target: &FlashTarget) -> String {
    if target.is_reset() {
        format!(
            "Put the {} half into bootloader mode to clear its settings. Ready?",
            target.role
        )
    } else {
        format!(
            "Put the {} half into bootloader mode to install new firmware. Ready?",
            target.role
        )
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
