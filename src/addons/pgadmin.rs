use anyhow::Result;
use simplelog::*;

use super::{apply_route, ensure_helm_repo, helm_upgrade_install, Addon, Chart, Route, RUNIX};
use crate::configparser::{AddonKind, ClusterConfig};
use crate::workspace::Workspace;

/// pgAdmin 4 from the runix chart.
pub struct PgAdmin;

impl Addon for PgAdmin {
    fn kind(&self) -> AddonKind {
        AddonKind::PgAdmin
    }

    fn install(&self, ws: &Workspace, config: &ClusterConfig) -> Result<()> {
        let spec = &config.pgadmin;
        info!("Installing pgAdmin...");

        ensure_helm_repo(ws, &RUNIX)?;
        helm_upgrade_install(
            ws,
            config,
            &Chart {
                release: "pgadmin",
                chart: "runix/pgadmin4",
                namespace: &spec.namespace,
                values: vec![
                    ("env.email", spec.email.as_str()),
                    ("env.password", spec.password.as_str()),
                ],
            },
        )?;

        apply_route(
            ws,
            config,
            &Route {
                addon: "pgadmin",
                host: &spec.ingress,
                namespace: &spec.namespace,
                service: "pgadmin-pgadmin4",
                port: 80,
                backend_https: false,
            },
        )?;

        info!("<green>✅ Installed pgAdmin with ingress: {}</>", spec.ingress);
        Ok(())
    }
}
