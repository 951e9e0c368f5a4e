use anyhow::{Context, Result};
use minijinja::context;
use simplelog::*;

use super::{apply_manifest, apply_route, Addon, Route};
use crate::configparser::config::MailpitSpec;
use crate::configparser::{AddonKind, ClusterConfig};
use crate::templates;
use crate::utils::render_strict;
use crate::workspace::Workspace;

pub struct Mailpit;

/// `user:password` for the web UI, if both halves are configured.
pub fn ui_auth(spec: &MailpitSpec) -> Option<String> {
    match (spec.username.as_str(), spec.password.as_str()) {
        ("", _) | (_, "") => None,
        (user, pass) => Some(format!("{user}:{pass}")),
    }
}

pub fn render_manifest(spec: &MailpitSpec) -> Result<String> {
    render_strict(
        templates::MAILPIT,
        context! {
            namespace => &spec.namespace,
            ui_auth => ui_auth(spec),
        },
    )
}

impl Addon for Mailpit {
    fn kind(&self) -> AddonKind {
        AddonKind::Mailpit
    }

    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()> {
        let spec = &config.mailpit;
        info!("Installing Mailpit...");

        apply_manifest(ws, config, "mailpit", &render_manifest(spec)?)
            .context("failed to deploy Mailpit")?;

        apply_route(
            ws,
            config,
            &Route {
                addon: "mailpit",
                host: &spec.ingress,
                namespace: &spec.namespace,
                service: "mailpit",
                port: 80,
                backend_https: false,
            },
        )?;

        info!("<green>✅ Installed Mailpit with ingress: {}</>", spec.ingress);
        Ok(())
    }
}
