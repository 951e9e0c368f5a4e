// Installers for the optional services that run inside the cluster.
//
// Chart-backed addons go through `helm upgrade --install`, the rest apply a
// manifest directly. Either way the addon finishes by applying an Ingress
// that routes its hostname to the addon's service.

use anyhow::{Context, Result};
use minijinja::context;
use simplelog::*;

use crate::configparser::{AddonKind, ClusterConfig};
use crate::runner::command_line;
use crate::templates;
use crate::utils::{render_strict, TransientFile};
use crate::workspace::Workspace;

pub mod adminer;
pub mod dashboard;
pub mod mailpit;
pub mod pgadmin;
pub mod postgres;
pub mod rabbitmq;
pub mod redis;

pub use adminer::Adminer;
pub use dashboard::Dashboard;
pub use mailpit::Mailpit;
pub use pgadmin::PgAdmin;
pub use postgres::Postgres;
pub use rabbitmq::RabbitMq;
pub use redis::Redis;

/// One installable addon.
pub trait Addon {
    fn kind(&self) -> AddonKind;

    /// Install or upgrade the addon into the cluster named by `config`.
    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()>;
}

/// The installer responsible for `kind`.
pub fn installer(kind: AddonKind) -> &'static dyn Addon {
    match kind {
        AddonKind::Dashboard => &Dashboard,
        AddonKind::Postgres => &Postgres,
        AddonKind::Redis => &Redis,
        AddonKind::PgAdmin => &PgAdmin,
        AddonKind::Adminer => &Adminer,
        AddonKind::RabbitMq => &RabbitMq,
        AddonKind::Mailpit => &Mailpit,
    }
}

//
// helm
//

#[derive(Debug, Clone, Copy)]
pub struct HelmRepo {
    pub name: &'static str,
    pub url: &'static str,
}

pub const BITNAMI: HelmRepo = HelmRepo {
    name: "bitnami",
    url: "https://charts.bitnami.com/bitnami",
};

pub const RUNIX: HelmRepo = HelmRepo {
    name: "runix",
    url: "https://helm.runix.net",
};

/// Register (best-effort) and refresh a chart repository.
pub fn ensure_helm_repo(ws: &Workspace, repo: &HelmRepo) -> Result<()> {
    if let Err(e) = ws.runner.stream("helm", &["repo", "add", repo.name, repo.url]) {
        warn!(
            "Failed to add {} Helm repo, it may already exist: {e:#}",
            repo.name
        );
    }

    ws.runner
        .stream("helm", &["repo", "update"])
        .context("failed to update Helm repositories")?;

    info!("Ensured {} Helm repository", repo.name);
    Ok(())
}

/// A chart release plus its `--set` overrides.
#[derive(Debug)]
pub struct Chart<'a> {
    pub release: &'static str,
    pub chart: &'static str,
    pub namespace: &'a str,
    pub values: Vec<(&'static str, &'a str)>,
}

/// `helm upgrade --install`, so re-running converges instead of failing on
/// an existing release.
pub fn helm_upgrade_install(ws: &Workspace, config: &ClusterConfig, chart: &Chart) -> Result<()> {
    let kube_context = config.cluster.kube_context();
    let mut args: Vec<String> = [
        "upgrade",
        "--install",
        chart.release,
        chart.chart,
        "--namespace",
        chart.namespace,
        "--create-namespace",
        "--kube-context",
        kube_context.as_str(),
    ]
    .iter()
    .map(|a| a.to_string())
    .collect();

    for (key, value) in &chart.values {
        args.push("--set".to_string());
        args.push(set_value(key, value));
    }

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    ws.runner
        .stream("helm", &args)
        .with_context(|| format!("failed to install chart {}", chart.chart))
}

/// `key=value` for `helm --set`, escaping the characters helm splits on.
pub fn set_value(key: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace(',', "\\,");
    format!("{key}={escaped}")
}

//
// kubectl
//

/// Write `manifest` to a transient file and `kubectl apply` it.
pub fn apply_manifest(
    ws: &Workspace,
    config: &ClusterConfig,
    file_prefix: &str,
    manifest: &str,
) -> Result<()> {
    trace!("{file_prefix} manifest:\n{manifest}");
    let file = TransientFile::create(&ws.workdir, file_prefix, manifest)?;
    kubectl_apply(ws, config, &file.arg())
}

/// `kubectl apply -f` against the configured cluster; `source` may be a
/// path or a URL.
pub fn kubectl_apply(ws: &Workspace, config: &ClusterConfig, source: &str) -> Result<()> {
    let kube_context = config.cluster.kube_context();
    let args = ["--context", kube_context.as_str(), "apply", "-f", source];

    ws.runner
        .stream("kubectl", &args)
        .with_context(|| format!("failed to apply manifest: {}", command_line("kubectl", &args)))
}

/// Where an addon's hostname should be routed.
#[derive(Debug, Clone)]
pub struct Route<'a> {
    pub addon: &'static str,
    pub host: &'a str,
    pub namespace: &'a str,
    pub service: &'static str,
    pub port: u16,
    /// Backend speaks TLS itself.
    pub backend_https: bool,
}

pub fn render_route(route: &Route) -> Result<String> {
    render_strict(
        templates::INGRESS,
        context! {
            name => route.addon,
            host => route.host,
            namespace => route.namespace,
            service => route.service,
            port => route.port,
            backend_https => route.backend_https,
        },
    )
}

/// Render and apply the Ingress for `route`.
pub fn apply_route(ws: &Workspace, config: &ClusterConfig, route: &Route) -> Result<()> {
    let manifest = render_route(route)?;
    apply_manifest(ws, config, &format!("{}-ingress", route.addon), &manifest)
        .with_context(|| format!("failed to apply ingress for {}", route.addon))
}
