pub mod config;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use itertools::Itertools;
use simplelog::*;

pub use config::{AddonKind, ClusterConfig, LogLevel};

pub const DEFAULT_CONFIG_PATH: &str = "kindctl.yaml";

/// Load the configuration document at `path`, applying `KINDCTL_*`
/// environment overrides on top.
pub fn parse(path: &Path) -> Result<ClusterConfig> {
    debug!("trying to parse {path:?}");

    if !path.is_file() {
        bail!(
            "configuration file {} not found (run `kindctl init` to create it)",
            path.display()
        );
    }

    // figment would lowercase keys after this mapping runs, which breaks the
    // one camelCase key we have, so do the lowercasing here instead
    let env_overrides = Env::prefixed("KINDCTL_")
        .lowercase(false)
        .split("_")
        .map(|key| {
            key.as_str()
                .to_lowercase()
                .replace("cluster.workernodes", "cluster.workerNodes")
                .into()
        });
    trace!(
        "overriding config with envvar values: {}",
        env_overrides
            .iter()
            .map(|(key, val)| format!("{}='{}'", key.string, val))
            .join(", ")
    );

    let config: ClusterConfig = Figment::from(Yaml::file(path))
        .merge(env_overrides)
        .extract()
        .with_context(|| format!("failed to parse {}", path.display()))?;

    config.validate()?;

    trace!("got config: {config:#?}");

    Ok(config)
}

/// Write `config` to `path`. Disabled addons are left out of the document.
pub fn save(path: &Path, config: &ClusterConfig) -> Result<()> {
    let persisted = config::PersistedConfig::from(config);
    let yaml = serde_yml::to_string(&persisted).context("could not serialize configuration")?;

    fs::write(path, yaml).with_context(|| format!("could not write {}", path.display()))
}

/// Create the default document at `path` unless something is already there.
/// Returns whether a file was written.
pub fn write_default_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    save(path, &ClusterConfig::default())?;
    Ok(true)
}

/// Log level requested by the document at `path`, if it exists and parses.
pub fn peek_log_level(path: &Path) -> Option<LogLevel> {
    if !path.is_file() {
        return None;
    }
    parse(path).ok().map(|c| c.logging.level)
}

/// RFC 1123 hostname check: dot-separated labels of 1-63 alphanumerics or
/// interior hyphens, 253 characters overall.
pub fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.len() > 253 {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
