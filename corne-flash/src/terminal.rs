// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Interactive operator: prompts on the terminal, spinners for long steps.

use std::cell::RefCell;
use std::io;
use std::thread;
use std::time::Duration;

use corne_common::Operator;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, InquireError};

const TICK: Duration = Duration::from_millis(100);

pub struct TerminalOperator {
    spinner: RefCell<Option<ProgressBar>>,
}

impl TerminalOperator {
    pub fn new() -> Self {
        Self {
            spinner: RefCell::new(None),
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK);
        pb
    }
}

impl Operator for TerminalOperator {
    fn acknowledge(&self, prompt: &str) -> io::Result<bool> {
        println!();
        match Confirm::new(prompt)
            .with_default(true)
            .with_help_message("Double-tap reset on the half, then press Enter. 'n' aborts.")
            .prompt()
        {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
            Err(InquireError::IO(e)) => Err(e),
            Err(e) => Err(io::Error::other(e.to_string())),
        }
    }

    fn begin(&self, message: &str) {
        log::debug!("{}", message);
        let previous = self.spinner.borrow_mut().replace(Self::spinner(message));
        if let Some(pb) = previous {
            pb.finish_and_clear();
        }
    }

    fn end(&self, message: &str) {
        match self.spinner.borrow_mut().take() {
            Some(pb) => pb.finish_with_message(message.to_string()),
            None => println!("{}", message),
        }
    }

    fn settle(&self, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        let pb = Self::spinner("Waiting for the half to reboot...");
        thread::sleep(interval);
        pb.finish_and_clear();
    }
}
