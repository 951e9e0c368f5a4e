use std::time::Duration;

use thiserror::Error;

/// Failures that callers may want to tell apart. Everything else travels as
/// a plain `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum KindctlError {
    /// A required external tool is absent and could not be installed here.
    #[error("{tool} is not installed: {hint}")]
    PrerequisiteMissing { tool: String, hint: String },

    /// The container runtime is absent or not running.
    #[error("{0}")]
    EnvironmentNotReady(String),

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { waited: Duration, what: String },

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
