// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! The human at the keyboard.
//!
//! Flashing needs physical actions (double-tapping reset to enter the
//! bootloader), so each write is gated on an explicit acknowledgment. The
//! wait has no timeout.

use std::io;
use std::thread;
use std::time::Duration;

pub trait Operator {
    /// Block until the operator answers `prompt`.
    ///
    /// Returns `Ok(false)` when the operator declines.
    fn acknowledge(&self, prompt: &str) -> io::Result<bool>;

    /// A long-running step has started.
    fn begin(&self, message: &str) {
        log::info!("{}", message);
    }

    /// The step started by [`Operator::begin`] has finished.
    fn end(&self, message: &str) {
        log::info!("{}", message);
    }

    /// Give a rebooting device time to come back.
    fn settle(&self, interval: Duration) {
        thread::sleep(interval);
    }
}
