// Create, finish setting up, and tear down the local kind cluster.
//
// Everything after the existence check is safe to re-apply, so a failed
// `init` is recovered by running `init --resume` against the same cluster.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use simplelog::*;

use crate::configparser::{self, ClusterConfig};
use crate::errors::KindctlError;
use crate::prereqs;
use crate::runner::CommandRunner;
use crate::utils::TransientFile;
use crate::workspace::Workspace;

pub mod ingress_controller;
pub mod topology;

pub use topology::Topology;

const READY_JSONPATH: &str =
    "jsonpath={.items[*].status.conditions[?(@.type=='Ready')].status}";

/// How long and how often to poll for node readiness after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for Readiness {
    fn default() -> Self {
        Readiness {
            timeout: Duration::from_secs(120),
            interval: Duration::from_secs(5),
        }
    }
}

/// What `initialize` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyExists,
    /// Cluster existed; post-creation steps were re-applied.
    Resumed,
}

/// The kind CLI, for the cluster-level operations.
pub struct Kind<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Kind<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Kind { runner }
    }

    pub fn clusters(&self) -> Result<Vec<String>> {
        let out = self
            .runner
            .output("kind", &["get", "clusters"])
            .context("failed to get kind clusters")?;

        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Exact, case-sensitive name match against the existing clusters.
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.clusters()?.iter().any(|c| c == name))
    }

    pub fn create(&self, name: &str, config_path: &str) -> Result<()> {
        self.runner
            .stream(
                "kind",
                &["create", "cluster", "--name", name, "--config", config_path],
            )
            .context("failed to create kind cluster")
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.runner
            .stream("kind", &["delete", "cluster", "--name", name])
            .context("failed to delete kind cluster")
    }
}

/// Bootstrap everything `update` needs: the configuration document, the
/// external tools and the cluster itself.
pub fn initialize(ws: &Workspace, config_path: &Path, resume: bool) -> Result<InitOutcome> {
    if configparser::write_default_if_missing(config_path)? {
        info!(
            "<green>✅ Created default configuration file: {}</>",
            config_path.display()
        );
    } else {
        info!("{} file already exists.", config_path.display());
    }
    let config = configparser::parse(config_path)?;

    prereqs::ensure_prerequisites(ws)?;

    let kind = Kind::new(ws.runner);
    let name = &config.cluster.name;
    let topology = Topology::for_cluster(&config.cluster);

    if kind.exists(name)? {
        info!("Cluster '{name}' already exists.");
        if !resume {
            return Ok(InitOutcome::AlreadyExists);
        }

        info!("Resuming setup of cluster '{name}'...");
        finish_setup(ws, &config, &topology)?;
        return Ok(InitOutcome::Resumed);
    }

    create_cluster(ws, &kind, &topology)?;
    finish_setup(ws, &config, &topology)?;
    Ok(InitOutcome::Created)
}

fn create_cluster(ws: &Workspace, kind: &Kind, topology: &Topology) -> Result<()> {
    let descriptor = TransientFile::create(&ws.workdir, "kind-config", &topology.to_yaml()?)?;
    trace!("kind config:\n{}", topology.to_yaml()?);

    info!(
        "Creating Kind cluster with {} control-plane and {} worker node(s)...",
        topology.control_planes(),
        topology.workers()
    );
    kind.create(&topology.name, &descriptor.arg())?;

    info!("<green>✅ Created Kind cluster: {}</>", topology.name);
    Ok(())
}

/// Steps after creation. Each is idempotent.
fn finish_setup(ws: &Workspace, config: &ClusterConfig, topology: &Topology) -> Result<()> {
    let kube_context = config.cluster.kube_context();

    wait_for_nodes_ready(ws, &kube_context)?;
    label_workers(ws, &kube_context, topology)?;
    ingress_controller::install(ws, &kube_context)
}

/// Poll node conditions until every node is Ready or the timeout passes.
pub fn wait_for_nodes_ready(ws: &Workspace, kube_context: &str) -> Result<()> {
    info!("Waiting for nodes to be ready...");
    let start = Instant::now();

    loop {
        let statuses = ws
            .runner
            .output(
                "kubectl",
                &["--context", kube_context, "get", "nodes", "-o", READY_JSONPATH],
            )
            .context("failed to check node status")?;

        if all_ready(&statuses) {
            info!("All nodes are ready.");
            return Ok(());
        }
        debug!("node ready statuses: {}", statuses.trim());

        if start.elapsed() >= ws.readiness.timeout {
            return Err(KindctlError::Timeout {
                waited: ws.readiness.timeout,
                what: "nodes to be ready".to_string(),
            }
            .into());
        }

        thread::sleep(ws.readiness.interval);
    }
}

fn all_ready(statuses: &str) -> bool {
    let mut statuses = statuses.split_whitespace().peekable();
    statuses.peek().is_some() && statuses.all(|s| s == "True")
}

/// Label workers so the kind flavour of ingress-nginx schedules on them.
pub fn label_workers(ws: &Workspace, kube_context: &str, topology: &Topology) -> Result<()> {
    info!("Labeling worker nodes for NGINX ingress...");
    for node in topology.worker_names() {
        ws.runner
            .stream(
                "kubectl",
                &[
                    "--context",
                    kube_context,
                    "label",
                    "nodes",
                    &node,
                    "ingress-ready=true",
                    "--overwrite",
                ],
            )
            .with_context(|| format!("failed to label worker node {node}"))?;
    }
    info!("<green>✅ Worker nodes labeled with ingress-ready=true</>");
    Ok(())
}

/// Delete the named cluster.
pub fn destroy(ws: &Workspace, name: &str) -> Result<()> {
    Kind::new(ws.runner).delete(name)?;
    info!("Deleted Kind cluster: {name}");
    Ok(())
}
