use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cluster_setup::Readiness;
use crate::hosts::HostsFile;
use crate::prereqs::Platform;
use crate::runner::CommandRunner;

/// Everything the engine needs from its surroundings, built once at the CLI
/// boundary and passed down by reference.
pub struct Workspace<'a> {
    pub runner: &'a dyn CommandRunner,
    /// Where transient manifests and downloads are written.
    pub workdir: PathBuf,
    pub platform: Platform,
    pub hosts: HostsFile,
    pub readiness: Readiness,
    /// Ping the container runtime before doing anything.
    pub check_runtime: bool,
    /// Install downloaded tools here instead of the platform default.
    pub install_dir: Option<PathBuf>,
}

impl<'a> Workspace<'a> {
    /// Workspace for the current process: cwd, host platform, system hosts
    /// file, and the runtime check unless `CI=true`.
    pub fn from_env(runner: &'a dyn CommandRunner) -> Result<Self> {
        let workdir = env::current_dir().context("could not determine working directory")?;
        let platform = Platform::current();
        let check_runtime = env::var("CI").map(|v| v != "true").unwrap_or(true);

        Ok(Workspace {
            runner,
            workdir,
            hosts: HostsFile::system(&platform),
            platform,
            readiness: Readiness::default(),
            check_runtime,
            install_dir: None,
        })
    }
}
