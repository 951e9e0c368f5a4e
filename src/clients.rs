// Client for the container runtime that kind runs its nodes in.

use anyhow::Result;
use bollard::Docker;
use simplelog::*;

use crate::errors::KindctlError;

/// Check that the Docker (or Podman) daemon is up and answering.
#[tokio::main(flavor = "current_thread")] // make this a sync function
pub async fn docker_ping() -> Result<()> {
    debug!("connecting to docker...");
    let not_running = || {
        KindctlError::EnvironmentNotReady(
            "Docker is not running. Please start Docker Desktop or Rancher Desktop".to_string(),
        )
    };

    // truncate error chain with new error (returned error is way too verbose)
    let client = Docker::connect_with_defaults().map_err(|_| not_running())?;
    client.ping().await.map_err(|_| not_running())?;

    Ok(())
}
