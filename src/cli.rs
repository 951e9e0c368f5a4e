use std::ffi::OsStr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::configparser::{LogLevel, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(disable_version_flag = true)]
/// Local kind cluster with ingress-routed development addons.
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_PATH,
        help = "configuration file"
    )]
    pub config: PathBuf,

    #[arg(
        short,
        long,
        global = true,
        value_enum,
        help = "log level (default: from config file, else info)"
    )]
    pub log_level: Option<LogLevel>,

    #[arg(short = 'v', long, global = true, help = "print version and exit")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install missing prerequisites and create the cluster.
    ///
    /// Writes a default configuration file first if none exists.
    Init {
        #[arg(
            long,
            help = "Re-run post-creation setup if the cluster already exists"
        )]
        resume: bool,
    },

    /// Install or upgrade every enabled addon in the existing cluster.
    Update,

    /// Delete the cluster.
    Destroy,

    /// Print the kindctl version.
    Version,
}

/// Whether `args` (without the program name) ask for the version anywhere.
/// Checked before clap sees the arguments so that `-v` still wins over an
/// unknown subcommand or a bad option value.
pub fn version_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_ref().to_str() {
            Some("-v" | "--version") => return true,
            Some("--") => return false,
            // the next argument is a value, not a flag
            Some("-c" | "--config" | "-l" | "--log-level") => {
                args.next();
            }
            _ => (),
        }
    }
    false
}
