use std::path::Path;

use anyhow::Result;

use crate::cluster_setup;
use crate::configparser;
use crate::runner::SystemRunner;
use crate::workspace::Workspace;

pub fn run(config_path: &Path) -> Result<()> {
    let config = configparser::parse(config_path)?;
    let runner = SystemRunner;
    let ws = Workspace::from_env(&runner)?;

    cluster_setup::destroy(&ws, &config.cluster.name)
}
