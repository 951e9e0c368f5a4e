// Everything that talks to kind/kubectl/helm/curl goes through here, so the
// rest of the crate can be driven by a fake in tests.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::{Context, Result};
use itertools::Itertools;
use simplelog::*;

use crate::errors::KindctlError;

/// Executes external programs.
pub trait CommandRunner {
    /// Run to completion and return captured stdout.
    fn output(&self, program: &str, args: &[&str]) -> Result<String>;

    /// Run to completion with stdout/stderr relayed to the terminal.
    fn stream(&self, program: &str, args: &[&str]) -> Result<()>;

    /// Like [`CommandRunner::stream`], feeding `input` on stdin.
    fn stream_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<()>;

    /// Whether `program` resolves on PATH.
    fn exists(&self, program: &str) -> bool;
}

/// Runs real processes through `duct`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!("running <bright-black>{}</>", command_line(program, args));
        let out = duct::cmd(program, args.iter().copied())
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .with_context(|| format!("could not start {program}"))?;

        check_output(program, args, &out)?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn stream(&self, program: &str, args: &[&str]) -> Result<()> {
        debug!("running <bright-black>{}</>", command_line(program, args));
        let out = duct::cmd(program, args.iter().copied())
            .unchecked()
            .run()
            .with_context(|| format!("could not start {program}"))?;

        check_status(program, args, out.status)
    }

    fn stream_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<()> {
        debug!("running <bright-black>{}</>", command_line(program, args));
        let out = duct::cmd(program, args.iter().copied())
            .stdin_bytes(input.as_bytes().to_vec())
            .unchecked()
            .run()
            .with_context(|| format!("could not start {program}"))?;

        check_status(program, args, out.status)
    }

    fn exists(&self, program: &str) -> bool {
        find_on_path(program).is_some()
    }
}

/// Render a command the way a user would type it, for logs and errors.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program).chain(args.iter().copied()).join(" ")
}

fn check_output(program: &str, args: &[&str], out: &Output) -> Result<()> {
    if out.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
    let message = match stderr.is_empty() {
        true => format!("exited with {}", out.status),
        false => stderr,
    };
    Err(KindctlError::CommandFailed {
        command: command_line(program, args),
        message,
    }
    .into())
}

fn check_status(program: &str, args: &[&str], status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(KindctlError::CommandFailed {
        command: command_line(program, args),
        message: format!("exited with {status}"),
    }
    .into())
}

/// Search PATH for an executable called `program`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;

    // windows resolves `kubectl` to `kubectl.exe` and friends
    let extensions: Vec<String> = if cfg!(windows) {
        env::var("PATHEXT")
            .unwrap_or_else(|_| ".EXE;.CMD;.BAT;.COM".to_string())
            .split(';')
            .map(|ext| ext.to_ascii_lowercase())
            .chain(std::iter::once(String::new()))
            .collect()
    } else {
        vec![String::new()]
    };

    env::split_paths(&paths)
        .flat_map(|dir| {
            extensions
                .iter()
                .map(move |ext| dir.join(format!("{program}{ext}")))
        })
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
