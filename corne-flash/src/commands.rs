// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Command implementations.

use anyhow::{Context, Result};

use corne_common::install_fsm;
use corne_common::{FlashOutcome, InstallConfig, InstallReport, Installer, SystemRunner};

use crate::terminal::TerminalOperator;

/// Print what a run with `config` would do.
pub fn plan(config: &InstallConfig) {
    println!("Repository: {}", config.repo);
    println!("Branch:     {}", config.branch);
    println!("Device:     {}", config.flash_tool.device.display());
    println!(
        "Reset:      {}",
        if config.skip_reset { "skipped" } else { "both halves" }
    );
    println!();
    println!("Stages:");
    for (i, stage) in install_fsm::plan(config.skip_reset).iter().enumerate() {
        println!("  {}. {}", i + 1, stage);
    }
}

/// Fetch, verify and flash.
pub fn install(config: &InstallConfig) -> Result<()> {
    println!(
        "Installing {}@{} ({})",
        config.repo,
        config.branch,
        if config.skip_reset {
            "settings reset skipped"
        } else {
            "with settings reset"
        }
    );
    println!();

    let runner = SystemRunner::new();
    let operator = TerminalOperator::new();
    let report = Installer::new(config, &runner, &operator)
        .run()
        .with_context(|| format!("Install of {}@{} aborted", config.repo, config.branch))?;

    summarize(&report);
    Ok(())
}

fn summarize(report: &InstallReport) {
    println!();
    if let Some(bundle) = &report.bundle {
        println!(
            "Firmware: {}@{} (run {})",
            bundle.repo, bundle.branch, bundle.run_id
        );
    }
    if let Some(check) = &report.tool_check {
        println!("Tool check: {:?}", check);
    }
    for (target, outcome) in &report.flashes {
        let status = match outcome {
            FlashOutcome::Success => "OK",
            FlashOutcome::ToleratedRebootError => "OK (rebooted)",
            FlashOutcome::Failure(_) => "FAILED",
        };
        println!("  {:<24} {}", target.to_string(), status);
    }
    println!();
    println!("Both halves flashed successfully!");
}
