// Local name resolution for addon ingress hostnames: one
// `127.0.0.1 <hostname>` line per addon in the hosts file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use simplelog::*;

use crate::configparser::is_valid_hostname;
use crate::errors::KindctlError;
use crate::prereqs::{Os, Platform};
use crate::workspace::Workspace;

pub const LOOPBACK: &str = "127.0.0.1";

/// How lines get appended to a file only root/Administrator may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Elevation {
    Sudo,
    PowerShell,
}

#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    elevation: Elevation,
}

impl HostsFile {
    /// The platform's hosts file.
    pub fn system(platform: &Platform) -> Self {
        HostsFile {
            path: platform.hosts_path(),
            elevation: match platform.os {
                Os::Windows => Elevation::PowerShell,
                _ => Elevation::Sudo,
            },
        }
    }

    /// A hosts file at an arbitrary location, appended to with `sudo tee`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        HostsFile {
            path: path.into(),
            elevation: Elevation::Sudo,
        }
    }

    // hosts files are not guaranteed to be UTF-8 (e.g. Latin-1 comments)
    fn read(&self) -> Result<String> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("failed to check hosts file {}", self.path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// The hosts line mapping `hostname` to loopback.
pub fn entry_for(hostname: &str) -> String {
    format!("{LOOPBACK} {hostname}")
}

fn contains_line(contents: &str, entry: &str) -> bool {
    contents.lines().any(|line| line.trim() == entry)
}

/// Map `hostname` to loopback unless the mapping already exists.
pub fn add_host_entry(ws: &Workspace, hostname: &str) -> Result<()> {
    if !is_valid_hostname(hostname) {
        return Err(KindctlError::InvalidConfig(format!(
            "{hostname:?} is not a valid hostname"
        ))
        .into());
    }

    let hosts = &ws.hosts;
    let entry = entry_for(hostname);
    let contents = hosts.read()?;

    if contains_line(&contents, &entry) {
        info!("Host entry already exists: {entry}");
        return Ok(());
    }

    // never glue our entry onto an unterminated last line
    let needs_newline = !contents.is_empty() && !contents.ends_with('\n');
    let path = hosts.path.to_string_lossy();

    match hosts.elevation {
        Elevation::Sudo => {
            let line = match needs_newline {
                true => format!("\n{entry}\n"),
                false => format!("{entry}\n"),
            };
            ws.runner
                .stream_with_input("sudo", &["tee", "-a", &path], &line)
                .with_context(|| format!("failed to append to {path}"))?;
        }
        Elevation::PowerShell => {
            let value = match needs_newline {
                true => format!("`r`n{entry}"),
                false => entry.clone(),
            };
            let script = format!("Add-Content -Path '{path}' -Value \"{value}\"");
            ws.runner
                .stream("powershell", &["-Command", &script])
                .with_context(|| format!("failed to append to {path}"))?;
        }
    }

    info!("<green>✅ Added hosts entry: {entry}</>");
    Ok(())
}
