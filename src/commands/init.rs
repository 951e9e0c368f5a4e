use std::path::Path;

use anyhow::Result;
use simplelog::*;

use crate::cluster_setup::{self, InitOutcome};
use crate::runner::SystemRunner;
use crate::workspace::Workspace;

pub fn run(config_path: &Path, resume: bool) -> Result<()> {
    let runner = SystemRunner;
    let ws = Workspace::from_env(&runner)?;

    match cluster_setup::initialize(&ws, config_path, resume)? {
        InitOutcome::Created => info!("<green>✅ Cluster is ready</>"),
        InitOutcome::Resumed => info!("<green>✅ Cluster setup resumed and finished</>"),
        InitOutcome::AlreadyExists => {
            info!("Nothing to do (use `kindctl init --resume` to re-run cluster setup)")
        }
    }
    info!("Run `kindctl update` to install the enabled addons.");
    Ok(())
}
