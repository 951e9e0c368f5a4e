use anyhow::{Context, Result};
use minijinja::context;
use simplelog::*;

use super::{apply_manifest, apply_route, Addon, Route};
use crate::configparser::{AddonKind, ClusterConfig};
use crate::templates;
use crate::utils::render_strict;
use crate::workspace::Workspace;

pub struct Adminer;

impl Addon for Adminer {
    fn kind(&self) -> AddonKind {
        AddonKind::Adminer
    }

    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()> {
        let spec = &config.adminer;
        info!("Installing Adminer...");

        let manifest = render_strict(
            templates::ADMINER,
            context! { namespace => &spec.namespace },
        )?;
        apply_manifest(ws, config, "adminer", &manifest)
            .context("failed to deploy Adminer")?;

        apply_route(
            ws,
            config,
            &Route {
                addon: "adminer",
                host: &spec.ingress,
                namespace: &spec.namespace,
                service: "adminer",
                port: 80,
                backend_https: false,
            },
        )?;

        info!("<green>✅ Installed Adminer with ingress: {}</>", spec.ingress);
        Ok(())
    }
}
