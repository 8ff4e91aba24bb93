// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Fakes for the process and operator seams, shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use corne_common::checksum::sha256_file;
use corne_common::{BundleLayout, CapturedOutput, CommandRunner, ImageKind, Invocation, Operator};

pub const RUN_LIST_OK: &str =
    r#"[{"databaseId":4242,"status":"completed","conclusion":"success","createdAt":"2026-10-01T12:00:00Z"}]"#;

/// Scripted stand-in for `gh`, `curl`, digest utilities and the flash tool.
pub struct FakeRunner {
    pub calls: RefCell<Vec<Invocation>>,
    pub available: Vec<String>,
    pub run_list: CapturedOutput,
    pub download: CapturedOutput,
    /// Paths, relative to `--dir`, created by `gh run download`.
    pub artifacts: Vec<String>,
    /// Flash results handed out in order; success once exhausted.
    pub flash_results: RefCell<VecDeque<io::Result<CapturedOutput>>>,
    /// Body written by `curl --output`; `None` makes curl fail.
    pub curl_body: Option<Vec<u8>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            available: vec!["gh".into(), "python3".into(), "curl".into()],
            run_list: CapturedOutput::new(Some(0), RUN_LIST_OK),
            download: CapturedOutput::new(Some(0), ""),
            artifacts: full_bundle(&BundleLayout::default()),
            flash_results: RefCell::new(VecDeque::new()),
            curl_body: None,
        }
    }

    pub fn without(mut self, program: &str) -> Self {
        self.available.retain(|p| p != program);
        self
    }

    pub fn with(mut self, program: &str) -> Self {
        self.available.push(program.to_string());
        self
    }

    pub fn with_flash_results(self, results: Vec<CapturedOutput>) -> Self {
        *self.flash_results.borrow_mut() = results.into_iter().map(Ok).collect();
        self
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|inv| inv.program == program)
            .cloned()
            .collect()
    }

    /// gh subcommands in call order, e.g. `["list", "download"]`.
    pub fn gh_subcommands(&self) -> Vec<String> {
        self.calls_to("gh")
            .iter()
            .filter_map(|inv| inv.args_lossy().get(1).cloned())
            .collect()
    }

    /// Image file names handed to the flash tool, in call order.
    pub fn flashed_images(&self) -> Vec<String> {
        self.calls_to("python3")
            .iter()
            .filter_map(|inv| inv.args_lossy().last().cloned())
            .filter_map(|arg| {
                Path::new(&arg)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CapturedOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        let args = invocation.args_lossy();

        match invocation.program.as_str() {
            "gh" if args.get(1).map(String::as_str) == Some("list") => Ok(self.run_list.clone()),
            "gh" if args.get(1).map(String::as_str) == Some("download") => {
                if self.download.success() {
                    let dir = PathBuf::from(value_after(&args, "--dir").unwrap_or_default());
                    for rel in &self.artifacts {
                        let path = dir.join(rel);
                        if let Some(parent) = path.parent() {
                            fs::create_dir_all(parent)?;
                        }
                        fs::write(&path, b"UF2 image")?;
                    }
                }
                Ok(self.download.clone())
            }
            "curl" => match &self.curl_body {
                Some(body) => {
                    let out = value_after(&args, "--output").unwrap_or_default();
                    fs::write(out, body)?;
                    Ok(CapturedOutput::new(Some(0), ""))
                }
                None => Ok(CapturedOutput::new(
                    Some(22),
                    "curl: (22) The requested URL returned error: 404",
                )),
            },
            "sha256sum" | "shasum" => {
                let file = args.last().cloned().unwrap_or_default();
                let hex = sha256_file(Path::new(&file))?;
                Ok(CapturedOutput::new(Some(0), format!("{}  {}\n", hex, file)))
            }
            _ => self
                .flash_results
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(CapturedOutput::new(Some(0), "Wrote image"))),
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.available
            .iter()
            .any(|p| p == program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Artifact layout as `gh run download` produces it: one dir per artifact.
pub fn full_bundle(layout: &BundleLayout) -> Vec<String> {
    vec![
        format!("firmware/{}", layout.file_name(ImageKind::Left)),
        format!("firmware/{}", layout.file_name(ImageKind::Right)),
        format!("firmware/{}", layout.file_name(ImageKind::Reset)),
    ]
}

/// Operator that always answers the same and records what it was asked.
pub struct FakeOperator {
    pub answer: bool,
    pub prompts: RefCell<Vec<String>>,
    pub settles: RefCell<Vec<Duration>>,
}

impl FakeOperator {
    pub fn agreeing() -> Self {
        Self {
            answer: true,
            prompts: RefCell::new(Vec::new()),
            settles: RefCell::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            answer: false,
            ..Self::agreeing()
        }
    }
}

impl Operator for FakeOperator {
    fn acknowledge(&self, prompt: &str) -> io::Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answer)
    }

    fn begin(&self, _message: &str) {}

    fn end(&self, _message: &str) {}

    fn settle(&self, interval: Duration) {
        self.settles.borrow_mut().push(interval);
    }
}

/// A flash script on disk plus its SHA-256.
pub fn write_tool(dir: &Path) -> (PathBuf, String) {
    let path = dir.join("flash.py");
    fs::write(&path, b"#!/usr/bin/env python3\nprint('flash')\n").unwrap();
    let digest = sha256_file(&path).unwrap();
    (path, digest)
}
