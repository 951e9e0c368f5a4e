use std::process::exit;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use simplelog::*;

use kindctl::cli::{self, Cli, Commands};
use kindctl::commands;
use kindctl::configparser::{self, LogLevel};

fn main() {
    // -v wins over everything, including a missing or unknown subcommand
    if cli::version_requested(std::env::args_os().skip(1)) {
        commands::version::run();
        return;
    }

    let cli = Cli::parse();
    if cli.version {
        commands::version::run();
        return;
    }

    let Some(command) = &cli.command else {
        // help goes to stdout; failing to print it changes nothing
        let _ = Cli::command().print_help();
        exit(2);
    };

    let level = cli
        .log_level
        .or_else(|| configparser::peek_log_level(&cli.config))
        .unwrap_or_default();
    setup_logging(level);

    debug!("args: {:?}", cli);

    if let Err(err) = dispatch(command, &cli) {
        eprintln!("Error: {err:#}");
        exit(1);
    }
}

fn dispatch(command: &Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Init { resume } => commands::init::run(&cli.config, *resume),
        Commands::Update => commands::update::run(&cli.config),
        Commands::Destroy => commands::destroy::run(&cli.config),
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
    }
}

fn setup_logging(level: LogLevel) {
    let log_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Trace)
        .build();

    if let Err(e) = TermLogger::init(
        level.filter(),
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("could not set up logging: {e}");
    }
}
