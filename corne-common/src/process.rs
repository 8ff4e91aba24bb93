// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! External command execution.
//!
//! Every tool the installer drives (`gh`, `curl`, the flashing script, an
//! optional system digest utility) is reached through [`CommandRunner`], so
//! the pipeline can be exercised in tests without spawning real processes.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A program plus its arguments, ready to be run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Arguments as UTF-8 strings, lossily converted.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit indication and combined stdout/stderr text of a finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub text: String,
}

impl CapturedOutput {
    pub fn new(code: Option<i32>, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs and finds them on `PATH`.
pub trait CommandRunner {
    /// Run to completion, capturing combined output.
    ///
    /// `Err` means the process could not be started at all.
    fn run(&self, invocation: &Invocation) -> io::Result<CapturedOutput>;

    /// Resolve a program name to an executable, if one is installed.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Clone, Debug)]
pub struct SystemRunner {
    path_env: String,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::with_path(std::env::var("PATH").unwrap_or_default())
    }

    pub fn with_path(path_env: impl Into<String>) -> Self {
        Self {
            path_env: path_env.into(),
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CapturedOutput> {
        log::debug!("exec: {}", invocation);

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .env("PATH", &self.path_env)
            // Avoid commands hanging waiting for input.
            .stdin(Stdio::null())
            .output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let captured = CapturedOutput::new(output.status.code(), text);
        log::debug!("exit: {:?} ({} bytes of output)", captured.code, captured.text.len());
        Ok(captured)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        if program.contains(std::path::MAIN_SEPARATOR) {
            let path = PathBuf::from(program);
            return is_executable(&path).then_some(path);
        }
        std::env::split_paths(&self.path_env)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display_joins_args() {
        let inv = Invocation::new("gh").arg("run").arg("list");
        assert_eq!(inv.to_string(), "gh run list");
    }

    #[test]
    fn test_locate_ignores_missing_program() {
        let runner = SystemRunner::with_path("");
        assert!(runner.locate("definitely-not-a-real-tool").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_finds_executable_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("gh");
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(dir.path().join("notes"), "not executable").unwrap();

        let runner = SystemRunner::with_path(dir.path().display().to_string());
        assert_eq!(runner.locate("gh"), Some(tool));
        assert!(runner.locate("notes").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_stdout_and_stderr() {
        let runner = SystemRunner::with_path("/bin:/usr/bin");
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3");
        let out = runner.run(&inv).unwrap();
        assert_eq!(out.code, Some(3));
        assert!(!out.success());
        assert!(out.text.contains("out"));
        assert!(out.text.contains("err"));
    }
}
