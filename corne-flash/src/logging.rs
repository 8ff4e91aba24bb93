// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Logger setup.

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Log to stderr at `info`, or at the level picked by `-v` / `-q`.
/// `RUST_LOG` still refines individual modules.
pub fn init(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(Target::Stderr)
        .format_timestamp(None)
        .init();
}
