// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Firmware retrieval from GitHub Actions through the `gh` CLI.

use std::path::Path;

use serde::Deserialize;

use crate::bundle::FirmwareBundle;
use crate::error::{InstallError, Result};
use crate::operator::Operator;
use crate::process::{CommandRunner, Invocation};

/// One entry of `gh run list --json`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub database_id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default)]
    pub created_at: String,
}

impl WorkflowRun {
    pub fn succeeded(&self) -> bool {
        self.status == "completed" && self.conclusion == "success"
    }
}

/// Pick the newest completed, successful run.
///
/// `gh` lists runs newest first, so the first match is the most recent.
pub fn select_run(runs: &[WorkflowRun]) -> Option<&WorkflowRun> {
    runs.iter().find(|run| run.succeeded())
}

/// Parse the JSON array printed by `gh run list --json ...`.
pub fn parse_run_list(json: &str) -> serde_json::Result<Vec<WorkflowRun>> {
    serde_json::from_str(json)
}

pub struct ArtifactFetcher<'a, R, O> {
    runner: &'a R,
    operator: &'a O,
}

impl<'a, R: CommandRunner, O: Operator> ArtifactFetcher<'a, R, O> {
    pub fn new(runner: &'a R, operator: &'a O) -> Self {
        Self { runner, operator }
    }

    /// Locate the latest successful build of `branch` and download its
    /// artifacts into `dest`.
    pub fn fetch(&self, repo: &str, branch: &str, dest: &Path) -> Result<FirmwareBundle> {
        let run = self.latest_successful_run(repo, branch)?;
        log::info!(
            "Using run {} of {} on {} (created {})",
            run.database_id,
            repo,
            branch,
            if run.created_at.is_empty() { "?" } else { run.created_at.as_str() }
        );

        self.download(repo, run.database_id, dest)?;

        Ok(FirmwareBundle {
            repo: repo.to_string(),
            branch: branch.to_string(),
            run_id: run.database_id,
            dir: dest.to_path_buf(),
        })
    }

    fn latest_successful_run(&self, repo: &str, branch: &str) -> Result<WorkflowRun> {
        let invocation = Invocation::new("gh")
            .arg("run")
            .arg("list")
            .arg("--repo")
            .arg(repo)
            .arg("--branch")
            .arg(branch)
            .arg("--status")
            .arg("success")
            .arg("--limit")
            .arg("1")
            .arg("--json")
            .arg("databaseId,status,conclusion,createdAt");

        let what = format!("build list for {}@{}", repo, branch);
        let out = self
            .runner
            .run(&invocation)
            .map_err(|e| InstallError::DownloadFailed {
                what: what.clone(),
                message: format!("failed to run gh: {}", e),
            })?;
        if !out.success() {
            return Err(InstallError::DownloadFailed {
                what,
                message: out.text.trim().to_string(),
            });
        }

        let runs = parse_run_list(out.text.trim()).map_err(|e| InstallError::DownloadFailed {
            what,
            message: format!("unexpected gh output: {}", e),
        })?;

        select_run(&runs)
            .cloned()
            .ok_or_else(|| InstallError::NoSuccessfulBuild {
                repo: repo.to_string(),
                branch: branch.to_string(),
            })
    }

    fn download(&self, repo: &str, run_id: u64, dest: &Path) -> Result<()> {
        let invocation = Invocation::new("gh")
            .arg("run")
            .arg("download")
            .arg(run_id.to_string())
            .arg("--repo")
            .arg(repo)
            .arg("--dir")
            .arg(dest);

        let what = format!("artifacts of run {}", run_id);
        self.operator
            .begin(&format!("Downloading firmware from run {}...", run_id));
        let result = self.runner.run(&invocation);

        match result {
            Ok(out) if out.success() => {
                self.operator.end("Firmware downloaded");
                Ok(())
            }
            Ok(out) => {
                self.operator.end("Download failed");
                Err(InstallError::DownloadFailed {
                    what,
                    message: out.text.trim().to_string(),
                })
            }
            Err(e) => {
                self.operator.end("Download failed");
                Err(InstallError::DownloadFailed {
                    what,
                    message: format!("failed to run gh: {}", e),
                })
            }
        }
    }
}
