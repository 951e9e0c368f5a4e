use anyhow::{Context, Result};
use itertools::Itertools;
use simplelog::*;

use crate::addons;
use crate::configparser::ClusterConfig;
use crate::hosts;
use crate::workspace::Workspace;

/// Install every enabled addon in order and map its hostname to loopback.
///
/// The first installer error aborts the run; hosts-file failures are only
/// logged. Returns how many addons were installed.
pub fn update_cluster(ws: &Workspace, config: &ClusterConfig) -> Result<usize> {
    for (host, kinds) in config.duplicate_ingresses() {
        warn!(
            "ingress hostname {host} is used by more than one addon: {}",
            kinds.iter().join(", ")
        );
    }

    let enabled = config.enabled_addons();
    if enabled.is_empty() {
        info!("No addons enabled in configuration, nothing to install");
        return Ok(0);
    }
    debug!("enabled addons: {}", enabled.iter().join(", "));

    for kind in &enabled {
        addons::installer(*kind)
            .install(ws, config)
            .with_context(|| format!("failed to install {kind}"))?;

        let host = config.ingress(*kind);
        if let Err(e) = hosts::add_host_entry(ws, host) {
            warn!("Failed to add hosts entry for {host}: {e:#}");
        }
    }

    Ok(enabled.len())
}
