// Make sure the host has Docker, kind, kubectl and helm before touching any
// cluster. Every step is a no-op when the tool is already on PATH.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use simplelog::*;

use crate::clients;
use crate::errors::KindctlError;
use crate::utils::{move_file, set_mode};
use crate::workspace::Workspace;

mod platform;
pub use platform::{Os, Platform};

pub const KIND_VERSION: &str = "v0.23.0";
const KUBECTL_STABLE_URL: &str = "https://dl.k8s.io/release/stable.txt";
const HELM_SCRIPT_URL: &str = "https://raw.githubusercontent.com/helm/helm/main/scripts/get-helm-3";
const HELM_WINDOWS_URL: &str = "https://get.helm.sh/helm-v3.15.4-windows-amd64.zip";
const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// The external tools the engine shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Kind,
    Kubectl,
    Helm,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Kind, Tool::Kubectl, Tool::Helm];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Kind => "kind",
            Tool::Kubectl => "kubectl",
            Tool::Helm => "helm",
        }
    }

    fn version_args(self) -> &'static [&'static str] {
        match self {
            Tool::Kind => &["version"],
            Tool::Kubectl => &["version", "--client"],
            Tool::Helm => &["version", "--short"],
        }
    }
}

/// Check the container runtime, then install and verify every tool.
pub fn ensure_prerequisites(ws: &Workspace) -> Result<()> {
    check_runtime(ws)?;
    bootstrap_package_manager(ws);

    for tool in Tool::ALL {
        install_tool(ws, tool)?;
    }

    verify_tools(ws)
}

/// Docker must be installed and, outside CI, running.
pub fn check_runtime(ws: &Workspace) -> Result<()> {
    if !ws.runner.exists("docker") {
        return Err(KindctlError::PrerequisiteMissing {
            tool: "docker".to_string(),
            hint: "Please install Docker Desktop or Rancher Desktop".to_string(),
        }
        .into());
    }
    info!("Docker is installed.");

    if ws.check_runtime {
        clients::docker_ping()?;
        info!("Docker is running.");
    } else {
        debug!("CI environment, skipping Docker liveness check");
    }
    Ok(())
}

/// Best-effort: get the host package manager in place. Failures only warn.
pub fn bootstrap_package_manager(ws: &Workspace) {
    match ws.platform.os {
        Os::MacOs => {
            if ws.runner.exists("brew") {
                info!("Homebrew is already installed.");
                return;
            }
            info!("Installing Homebrew...");
            let script = format!("/bin/bash -c \"$(curl -fsSL {HOMEBREW_INSTALL_URL})\"");
            match ws.runner.stream("/bin/bash", &["-c", &script]) {
                Ok(()) => info!("<green>✅ Homebrew installed.</>"),
                Err(e) => warn!("Failed to install Homebrew, continuing without it: {e:#}"),
            }
        }
        Os::Windows => {
            if ws.runner.exists("winget") {
                info!("winget is already installed.");
            } else {
                warn!("winget not found; install it from https://github.com/microsoft/winget-cli or the Microsoft Store. Continuing without it.");
            }
        }
        _ => (),
    }
}

/// Install one tool if it is not on PATH yet.
pub fn install_tool(ws: &Workspace, tool: Tool) -> Result<()> {
    let name = tool.name();
    if ws.runner.exists(name) {
        info!("{name} is already installed.");
        return Ok(());
    }

    if ws.platform.os == Os::MacOs && ws.runner.exists("brew") {
        info!("Installing {name} via Homebrew...");
        ws.runner
            .stream("brew", &["install", name])
            .with_context(|| format!("failed to install {name} via Homebrew"))?;
        info!("<green>✅ {name} installed.</>");
        return Ok(());
    }

    match tool {
        Tool::Kind => {
            let url = format!(
                "https://kind.sigs.k8s.io/dl/{KIND_VERSION}/kind-{}-{}",
                ws.platform.os_slug()?,
                ws.platform.arch_slug()?
            );
            install_binary(ws, tool, &url)
        }
        Tool::Kubectl => {
            let stable = ws
                .runner
                .output("curl", &["-fsSL", KUBECTL_STABLE_URL])
                .context("failed to get kubectl stable version")?;
            let url = format!(
                "https://dl.k8s.io/release/{}/bin/{}/{}/{}",
                stable.trim(),
                ws.platform.os_slug()?,
                ws.platform.arch_slug()?,
                ws.platform.executable(name)
            );
            install_binary(ws, tool, &url)
        }
        Tool::Helm => install_helm(ws),
    }
}

/// Download a single-file binary and move it onto PATH.
pub fn install_binary(ws: &Workspace, tool: Tool, url: &str) -> Result<()> {
    let name = tool.name();
    let binary = ws.platform.executable(name);
    info!("Installing {name}...");

    let download = ws.workdir.join(&binary);
    let download_arg = download.to_string_lossy().into_owned();
    ws.runner
        .stream("curl", &["-fLo", &download_arg, url])
        .with_context(|| format!("failed to download {name}"))?;
    set_mode(&download, 0o755)?;

    let dest_dir = install_dir(ws, tool);
    if !dest_dir.exists() {
        fs::create_dir_all(&dest_dir)
            .with_context(|| format!("failed to create directory {}", dest_dir.display()))?;
    }
    move_file(&download, &dest_dir.join(&binary))
        .with_context(|| format!("failed to install {name} to {}", dest_dir.display()))?;

    info!("<green>✅ {name} installed.</>");
    Ok(())
}

fn install_helm(ws: &Workspace) -> Result<()> {
    if ws.platform.os == Os::Windows {
        return Err(KindctlError::PrerequisiteMissing {
            tool: "helm".to_string(),
            hint: format!("download and extract helm from {HELM_WINDOWS_URL} and add it to PATH"),
        }
        .into());
    }

    info!("Installing helm...");
    let script = ws.workdir.join("get_helm.sh");
    let script_arg = script.to_string_lossy().into_owned();

    ws.runner
        .stream("curl", &["-fsSL", "-o", &script_arg, HELM_SCRIPT_URL])
        .context("failed to download helm install script")?;

    let result = set_mode(&script, 0o700).and_then(|_| {
        ws.runner
            .stream(&script_arg, &[])
            .context("failed to run helm install script")
    });

    if let Err(e) = fs::remove_file(&script) {
        warn!("Failed to clean up helm install script: {e}");
    }
    result?;

    info!("<green>✅ helm installed.</>");
    Ok(())
}

/// Every tool must now resolve on PATH; versions are reported for the log.
pub fn verify_tools(ws: &Workspace) -> Result<()> {
    info!("Verifying installations...");
    for tool in Tool::ALL {
        let name = tool.name();
        if !ws.runner.exists(name) {
            return Err(KindctlError::PrerequisiteMissing {
                tool: name.to_string(),
                hint: "installation failed; install it manually and re-run".to_string(),
            }
            .into());
        }

        match ws.runner.output(name, tool.version_args()) {
            Ok(version) => info!("{name} installed: {}", version.trim()),
            Err(e) => warn!("Failed to get version for {name}: {e:#}"),
        }
    }
    Ok(())
}

fn install_dir(ws: &Workspace, tool: Tool) -> PathBuf {
    match &ws.install_dir {
        Some(dir) => dir.clone(),
        None => ws.platform.default_install_dir(tool.name()),
    }
}
