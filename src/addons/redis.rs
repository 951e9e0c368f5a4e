use anyhow::Result;
use simplelog::*;

use super::{apply_route, ensure_helm_repo, helm_upgrade_install, Addon, Chart, Route, BITNAMI};
use crate::configparser::{AddonKind, ClusterConfig};
use crate::workspace::Workspace;

pub struct Redis;

impl Addon for Redis {
    fn kind(&self) -> AddonKind {
        AddonKind::Redis
    }

    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()> {
        let spec = &config.redis;
        info!("Installing Redis...");

        ensure_helm_repo(ws, &BITNAMI)?;
        helm_upgrade_install(
            ws,
            config,
            &Chart {
                release: "redis",
                chart: "bitnami/redis",
                namespace: &spec.namespace,
                // single node, no password: this is a development cluster
                values: vec![
                    ("architecture", "standalone"),
                    ("auth.enabled", "false"),
                ],
            },
        )?;

        apply_route(
            ws,
            config,
            &Route {
                addon: "redis",
                host: &spec.ingress,
                namespace: &spec.namespace,
                service: "redis-master",
                port: 6379,
                backend_https: false,
            },
        )?;

        info!("<green>✅ Installed Redis with ingress: {}</>", spec.ingress);
        Ok(())
    }
}
