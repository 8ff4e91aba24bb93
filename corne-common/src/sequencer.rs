// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Drives a full install through the stages of [`crate::install_fsm`].

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::artifact::ArtifactFetcher;
use crate::bundle::{locate_images, FirmwareBundle, FirmwareImages};
use crate::checksum::{ChecksumVerifier, VerifyResult};
use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::flash::{FlashOperation, FlashOutcome, FlashTarget, FlashTool};
use crate::install_fsm::Stage;
use crate::operator::Operator;
use crate::process::CommandRunner;
use crate::tool::ToolAsset;

const FLASH_TOOL_NAME: &str = "flash tool";

/// What a finished run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub stages: Vec<Stage>,
    pub tool_check: Option<VerifyResult>,
    pub bundle: Option<FirmwareBundle>,
    pub flashes: Vec<(FlashTarget, FlashOutcome)>,
}

/// Facts accumulated while moving through the stages.
#[derive(Default)]
struct RunState {
    tool: Option<ToolAsset>,
    bundle: Option<FirmwareBundle>,
    images: Option<FirmwareImages>,
}

pub struct Installer<'a, R, O> {
    config: &'a InstallConfig,
    runner: &'a R,
    operator: &'a O,
}

impl<'a, R: CommandRunner, O: Operator> Installer<'a, R, O> {
    pub fn new(config: &'a InstallConfig, runner: &'a R, operator: &'a O) -> Self {
        Self {
            config,
            runner,
            operator,
        }
    }

    /// Run every stage in order, stopping at the first error.
    pub fn run(&self) -> Result<InstallReport> {
        let scratch = self.scratch_dir()?;
        log::debug!("scratch directory: {}", scratch.path().display());

        let mut state = RunState::default();
        let mut report = InstallReport::default();
        let mut stage = Some(Stage::CheckPrereqs);

        while let Some(current) = stage {
            log::info!("Stage: {}", current);
            self.execute(current, scratch.path(), &mut state, &mut report)?;
            report.stages.push(current);
            stage = current.next(self.config.skip_reset);
        }

        Ok(report)
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let root = &self.config.scratch_root;
        fs::create_dir_all(root)
            .map_err(|e| InstallError::io(format!("failed to create {}", root.display()), e))?;
        tempfile::Builder::new()
            .prefix("corne-flash-")
            .tempdir_in(root)
            .map_err(|e| {
                InstallError::io(
                    format!("failed to create scratch directory in {}", root.display()),
                    e,
                )
            })
    }

    fn execute(
        &self,
        stage: Stage,
        scratch: &Path,
        state: &mut RunState,
        report: &mut InstallReport,
    ) -> Result<()> {
        match stage {
            Stage::CheckPrereqs => {
                let tool = self.resolve_tool(scratch)?;
                self.check_prereqs(&tool)?;
                state.tool = Some(tool);
            }
            Stage::VerifyTools => {
                let tool = state.tool.as_ref().ok_or_else(|| {
                    InstallError::PrerequisiteMissing(FLASH_TOOL_NAME.to_string())
                })?;
                report.tool_check = Some(self.verify_tool(tool)?);
            }
            Stage::FetchFirmware => {
                let dest = scratch.join("firmware");
                fs::create_dir_all(&dest).map_err(|e| {
                    InstallError::io(format!("failed to create {}", dest.display()), e)
                })?;
                let bundle = ArtifactFetcher::new(self.runner, self.operator).fetch(
                    &self.config.repo,
                    &self.config.branch,
                    &dest,
                )?;
                report.bundle = Some(bundle.clone());
                state.bundle = Some(bundle);
            }
            Stage::LocateImages => {
                let dir = state
                    .bundle
                    .as_ref()
                    .map(|b| b.dir.clone())
                    .unwrap_or_else(|| scratch.join("firmware"));
                let images = locate_images(&dir, &self.config.layout)?;
                log::debug!("images: {:?}", images);
                state.images = Some(images);
            }
            Stage::ResetRight | Stage::ResetLeft | Stage::FlashLeft | Stage::FlashRight => {
                let target = self.flash_target(stage, scratch, state)?;
                let outcome = self.flash(&target, state)?;
                report.flashes.push((target, outcome));
            }
            Stage::Done => log::info!("Install complete"),
        }
        Ok(())
    }

    fn resolve_tool(&self, scratch: &Path) -> Result<ToolAsset> {
        let cfg = &self.config.flash_tool;
        ToolAsset::resolve(
            FLASH_TOOL_NAME,
            cfg.path.as_deref(),
            cfg.source.as_deref(),
            cfg.sha256.as_deref(),
            scratch,
        )
    }

    fn check_prereqs(&self, tool: &ToolAsset) -> Result<()> {
        let missing: Vec<String> = self
            .config
            .required_programs(tool.needs_fetch())
            .into_iter()
            .filter(|program| self.runner.locate(program).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(InstallError::PrerequisiteMissing(format!(
                "not found on PATH: {}",
                missing.join(", ")
            )));
        }
        if !tool.is_present() && tool.source.is_none() {
            return Err(InstallError::PrerequisiteMissing(format!(
                "{} not found at {}",
                tool.name,
                tool.path.display()
            )));
        }
        Ok(())
    }

    fn verify_tool(&self, tool: &ToolAsset) -> Result<VerifyResult> {
        tool.acquire(self.runner)?;

        let Some(expected) = tool.sha256.as_deref() else {
            log::warn!("No SHA-256 pinned for {}; skipping integrity check", tool.name);
            return Ok(VerifyResult::Skipped);
        };

        ChecksumVerifier::new(self.runner, self.config.digest)
            .verify(&tool.path, expected, &tool.name)?
            .into_result(&tool.name)
    }

    fn flash_target(&self, stage: Stage, scratch: &Path, state: &RunState) -> Result<FlashTarget> {
        let images = state.images.as_ref().ok_or_else(|| InstallError::ImageNotFound {
            dir: scratch.to_path_buf(),
            missing: vec![stage.to_string()],
        })?;
        let (role, kind) = stage.flash_target().ok_or_else(|| InstallError::ImageNotFound {
            dir: scratch.to_path_buf(),
            missing: vec![stage.to_string()],
        })?;
        Ok(FlashTarget::new(role, kind, images.path(kind)))
    }

    fn flash(&self, target: &FlashTarget, state: &RunState) -> Result<FlashOutcome> {
        let script: PathBuf = state
            .tool
            .as_ref()
            .map(|t| t.path.clone())
            .ok_or_else(|| InstallError::PrerequisiteMissing(FLASH_TOOL_NAME.to_string()))?;
        let tool = FlashTool {
            interpreter: self.config.flash_tool.interpreter.clone(),
            script,
            device: self.config.flash_tool.device.clone(),
        };

        let outcome = FlashOperation::new(
            self.runner,
            self.operator,
            &tool,
            &self.config.io_error_signature,
            self.config.settle,
        )
        .flash(target)?;

        match outcome {
            FlashOutcome::Failure(output) => Err(InstallError::FlashFailed {
                target: target.clone(),
                output,
            }),
            ok => Ok(ok),
        }
    }
}
