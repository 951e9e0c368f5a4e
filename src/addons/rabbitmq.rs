use anyhow::Result;
use simplelog::*;

use super::{apply_route, ensure_helm_repo, helm_upgrade_install, Addon, Chart, Route, BITNAMI};
use crate::configparser::{AddonKind, ClusterConfig};
use crate::workspace::Workspace;

pub struct RabbitMq;

impl Addon for RabbitMq {
    fn kind(&self) -> AddonKind {
        AddonKind::RabbitMq
    }

    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()> {
        let spec = &config.rabbitmq;
        info!("Installing RabbitMQ...");

        ensure_helm_repo(ws, &BITNAMI)?;
        helm_upgrade_install(
            ws,
            config,
            &Chart {
                release: "rabbitmq",
                chart: "bitnami/rabbitmq",
                namespace: &spec.namespace,
                values: vec![
                    ("auth.username", spec.username.as_str()),
                    ("auth.password", spec.password.as_str()),
                ],
            },
        )?;

        // management UI
        apply_route(
            ws,
            config,
            &Route {
                addon: "rabbitmq",
                host: &spec.ingress,
                namespace: &spec.namespace,
                service: "rabbitmq",
                port: 15672,
                backend_https: false,
            },
        )?;

        info!("<green>✅ Installed RabbitMQ with ingress: {}</>", spec.ingress);
        Ok(())
    }
}
