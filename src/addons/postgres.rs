use anyhow::Result;
use simplelog::*;

use super::{apply_route, ensure_helm_repo, helm_upgrade_install, Addon, Chart, Route, BITNAMI};
use crate::configparser::{AddonKind, ClusterConfig};
use crate::workspace::Workspace;

/// PostgreSQL from the bitnami chart.
pub struct Postgres;

impl Addon for Postgres {
    fn kind(&self) -> AddonKind {
        AddonKind::Postgres
    }

    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()> {
        let spec = &config.postgres;
        info!("Installing PostgreSQL...");

        ensure_helm_repo(ws, &BITNAMI)?;
        helm_upgrade_install(
            ws,
            config,
            &Chart {
                release: "postgres",
                chart: "bitnami/postgresql",
                namespace: &spec.namespace,
                values: vec![
                    ("image.tag", spec.version.as_str()),
                    ("global.postgresql.auth.username", spec.username.as_str()),
                    ("global.postgresql.auth.password", spec.password.as_str()),
                    ("global.postgresql.auth.postgresPassword", spec.password.as_str()),
                    ("global.postgresql.auth.database", spec.database.as_str()),
                ],
            },
        )?;

        apply_route(
            ws,
            config,
            &Route {
                addon: "postgres",
                host: &spec.ingress,
                namespace: &spec.namespace,
                service: "postgres-postgresql",
                port: 5432,
                backend_https: false,
            },
        )?;

        info!("<green>✅ Installed PostgreSQL with ingress: {}</>", spec.ingress);
        Ok(())
    }
}
