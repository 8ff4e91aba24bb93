// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use corne_common::config::{
    DEFAULT_BRANCH, DEFAULT_DEVICE, DEFAULT_INTERPRETER, DEFAULT_REPO, IO_ERROR_SIGNATURE,
    IO_SIGNATURE_ENV, SCRATCH_ENV,
};
use corne_common::{BundleLayout, DigestMode, FlashToolConfig, InstallConfig};

use crate::commands;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "corne-flash")]
#[command(about = "Fetch ZMK firmware from GitHub Actions and flash both halves of a Corne")]
pub struct Cli {
    /// GitHub repository holding the ZMK config
    #[arg(value_name = "REPO", default_value = DEFAULT_REPO)]
    pub repo: String,

    /// Branch whose latest successful build is flashed
    #[arg(value_name = "BRANCH", default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Skip the settings reset of both halves (true/false)
    #[arg(
        value_name = "SKIP_RESET",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub skip_reset: bool,

    /// Root for the per-run scratch directory
    #[arg(long, env = SCRATCH_ENV, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Shield name used in image filenames
    #[arg(long, default_value = "corne")]
    pub shield: String,

    /// Board name used in image filenames
    #[arg(long, default_value = "nice_nano")]
    pub board: String,

    /// Board revision used in image filenames
    #[arg(long, default_value = "2.0.0")]
    pub board_version: String,

    /// Firmware suffix used in image filenames
    #[arg(long, default_value = "zmk")]
    pub firmware: String,

    /// Local path of the flashing script
    #[arg(long, value_name = "FILE")]
    pub flash_tool: Option<PathBuf>,

    /// URL to download the flashing script from when no local path is given
    /// [default: the published flash_uf2.py]
    #[arg(long, value_name = "URL")]
    pub flash_tool_url: Option<String>,

    /// Expected SHA-256 of the flashing script (lower-case hex)
    /// [default: pinned digest of the published flash_uf2.py]
    #[arg(long, value_name = "HEX")]
    pub flash_tool_sha256: Option<String>,

    /// Interpreter that runs the flashing script
    #[arg(long, default_value = DEFAULT_INTERPRETER)]
    pub python: String,

    /// Bootloader storage target passed to the flashing script
    #[arg(long, default_value = DEFAULT_DEVICE)]
    pub device: PathBuf,

    /// Text identifying the I/O error of a half rebooting mid-write
    #[arg(long, env = IO_SIGNATURE_ENV, default_value = IO_ERROR_SIGNATURE)]
    pub io_error_signature: String,

    /// Seconds to wait after each write for the half to reboot
    #[arg(long, default_value = "2", value_name = "SECS")]
    pub settle_secs: u64,

    /// How to compute tool digests: builtin, system or off
    #[arg(long, default_value = "builtin")]
    pub digest: DigestMode,

    /// Print the stages that would run and exit
    #[arg(long)]
    pub dry_run: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Build the install configuration from the parsed arguments.
    pub fn config(&self) -> InstallConfig {
        let defaults = InstallConfig::default();
        InstallConfig {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            skip_reset: self.skip_reset,
            scratch_root: self.scratch_dir.clone().unwrap_or(defaults.scratch_root),
            layout: BundleLayout {
                shield: self.shield.clone(),
                board: self.board.clone(),
                board_version: self.board_version.clone(),
                firmware: self.firmware.clone(),
            },
            flash_tool: self.flash_tool_config(),
            io_error_signature: self.io_error_signature.clone(),
            settle: std::time::Duration::from_secs(self.settle_secs),
            digest: self.digest,
        }
    }

    /// The published script and its pinned digest apply unless a custom tool
    /// location is given; a custom tool is only checked against an explicit
    /// `--flash-tool-sha256`.
    fn flash_tool_config(&self) -> FlashToolConfig {
        let defaults = FlashToolConfig::default();
        let custom = self.flash_tool.is_some() || self.flash_tool_url.is_some();
        let (source, sha256) = if custom {
            (self.flash_tool_url.clone(), self.flash_tool_sha256.clone())
        } else {
            (
                defaults.source,
                self.flash_tool_sha256.clone().or(defaults.sha256),
            )
        };

        FlashToolConfig {
            interpreter: self.python.clone(),
            path: self.flash_tool.clone(),
            source,
            sha256,
            device: self.device.clone(),
        }
    }
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.config();

    if cli.dry_run {
        commands::plan(&config);
        return Ok(());
    }
    commands::install(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corne_common::config::{DEFAULT_FLASH_TOOL_SHA256, DEFAULT_FLASH_TOOL_URL};

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["corne-flash"]).unwrap();
        let config = cli.config();
        assert_eq!(config.repo, DEFAULT_REPO);
        assert_eq!(config.branch, DEFAULT_BRANCH);
        assert!(!config.skip_reset);
        assert_eq!(config.io_error_signature, IO_ERROR_SIGNATURE);
        assert_eq!(config.settle, std::time::Duration::from_secs(2));
        assert_eq!(config.digest, DigestMode::Builtin);
    }

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["corne-flash", "x/y", "dev", "true"]).unwrap();
        assert_eq!(cli.repo, "x/y");
        assert_eq!(cli.branch, "dev");
        assert!(cli.skip_reset);
    }

    #[test]
    fn test_skip_reset_accepts_boolish_values() {
        for (value, expected) in [("yes", true), ("1", true), ("no", false), ("false", false)] {
            let cli = Cli::try_parse_from(["corne-flash", "x/y", "main", value]).unwrap();
            assert_eq!(cli.skip_reset, expected, "{}", value);
        }
    }

    #[test]
    fn test_default_flash_tool_is_published_script() {
        let config = Cli::try_parse_from(["corne-flash"]).unwrap().config();
        assert_eq!(config.flash_tool.path, None);
        assert_eq!(
            config.flash_tool.source.as_deref(),
            Some(DEFAULT_FLASH_TOOL_URL)
        );
        assert_eq!(
            config.flash_tool.sha256.as_deref(),
            Some(DEFAULT_FLASH_TOOL_SHA256)
        );
    }

    #[test]
    fn test_custom_flash_tool_drops_default_pin() {
        let config = Cli::try_parse_from(["corne-flash", "--flash-tool", "/opt/flash.py"])
            .unwrap()
            .config();
        assert_eq!(config.flash_tool.source, None);
        assert_eq!(config.flash_tool.sha256, None);
    }

    #[test]
    fn test_invalid_digest_mode_rejected() {
        assert!(Cli::try_parse_from(["corne-flash", "--digest", "md5"]).is_err());
    }

    #[test]
    fn test_flash_tool_flags_reach_config() {
        let cli = Cli::try_parse_from([
            "corne-flash",
            "--flash-tool",
            "/opt/flash.py",
            "--flash-tool-sha256",
            "abc",
            "--device",
            "/media/NICENANO",
            "--settle-secs",
            "0",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.flash_tool.path, Some(PathBuf::from("/opt/flash.py")));
        assert_eq!(config.flash_tool.sha256.as_deref(), Some("abc"));
        assert_eq!(config.flash_tool.device, PathBuf::from("/media/NICENANO"));
        assert!(config.settle.is_zero());
    }
}
