// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Fetch the latest ZMK build from CI and flash both halves of a Corne.
//!
//! Usage:
//!   corne-flash
//!   corne-flash jrhy/zmk-config-corne main
//!   corne-flash jrhy/zmk-config-corne main true --flash-tool ./flash.py
//!   corne-flash --dry-run

mod cli;
mod commands;
mod logging;
mod terminal;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose, args.quiet);
    cli::run(args)
}
