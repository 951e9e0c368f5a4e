use anyhow::{Context, Result};
use simplelog::*;

use super::{apply_route, kubectl_apply, Addon, Route};
use crate::configparser::{AddonKind, ClusterConfig};
use crate::workspace::Workspace;

/// Namespace the upstream dashboard manifest deploys into.
pub const NAMESPACE: &str = "kubernetes-dashboard";

pub fn manifest_url(version: &str) -> String {
    format!(
        "https://raw.githubusercontent.com/kubernetes/dashboard/{version}/aio/deploy/recommended.yaml"
    )
}

/// The upstream Kubernetes dashboard.
pub struct Dashboard;

impl Addon for Dashboard {
    fn kind(&self) -> AddonKind {
        AddonKind::Dashboard
    }

    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()> {
        let spec = &config.dashboard;
        info!("Installing Kubernetes Dashboard {}...", spec.version);

        kubectl_apply(ws, config, &manifest_url(&spec.version))
            .context("failed to install Kubernetes Dashboard")?;

        // dashboard serves its own TLS
        apply_route(
            ws,
            config,
            &Route {
                addon: "dashboard",
                host: &spec.ingress,
                namespace: NAMESPACE,
                service: "kubernetes-dashboard",
                port: 443,
                backend_https: true,
            },
        )?;

        info!(
            "<green>✅ Installed Kubernetes Dashboard with ingress: {}</>",
            spec.ingress
        );
        Ok(())
    }
}
