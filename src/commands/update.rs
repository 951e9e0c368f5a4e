use std::path::Path;

use anyhow::{bail, Result};
use simplelog::*;

use crate::cluster_setup::Kind;
use crate::configparser;
use crate::deploy;
use crate::runner::SystemRunner;
use crate::workspace::Workspace;

pub fn run(config_path: &Path) -> Result<()> {
    let config = configparser::parse(config_path)?;
    let runner = SystemRunner;
    let ws = Workspace::from_env(&runner)?;

    // has the cluster been set up?
    let name = &config.cluster.name;
    if !Kind::new(&runner).exists(name)? {
        bail!("cluster '{name}' does not exist (run `kindctl init` first)");
    }

    info!("Updating cluster '{name}'...");
    let installed = deploy::update_cluster(&ws, &config)?;
    info!("<green>✅ Cluster updated, {installed} addon(s) installed</>");
    Ok(())
}
