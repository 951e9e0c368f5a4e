// End-to-end runs of init / update / destroy against a scripted runner.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pretty_assertions::assert_eq;

use kindctl::cli::{version_requested, Cli, Commands};
use kindctl::cluster_setup::{self, InitOutcome, Readiness};
use kindctl::configparser::{self, LogLevel};
use kindctl::deploy;
use kindctl::hosts::HostsFile;
use kindctl::prereqs::{Os, Platform};
use kindctl::runner::{command_line, CommandRunner};
use kindctl::workspace::Workspace;

/// Pretends every tool is installed and every command succeeds, keeping
/// track of which kind clusters exist.
#[derive(Default)]
struct ScriptedRunner {
    log: RefCell<Vec<String>>,
    clusters: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.log.borrow().iter().filter(|l| l.starts_with(prefix)).count()
    }

    fn run(&self, program: &str, args: &[&str], input: Option<&str>) -> Result<String> {
        self.log.borrow_mut().push(command_line(program, args));

        match (program, args) {
            ("kind", ["get", "clusters"]) => return Ok(self.clusters.borrow().join("\n")),
            ("kind", ["create", "cluster", "--name", name, ..]) => {
                self.clusters.borrow_mut().push(name.to_string())
            }
            ("kind", ["delete", "cluster", "--name", name]) => {
                self.clusters.borrow_mut().retain(|c| c.as_str() != *name)
            }
            ("kubectl", [.., "get", "nodes", "-o", _]) => return Ok("True True".to_string()),
            ("sudo", ["tee", "-a", path]) => {
                let mut contents = fs::read_to_string(path)?;
                contents.push_str(input.unwrap_or_default());
                fs::write(path, contents)?;
            }
            _ => (),
        }
        Ok(String::new())
    }
}

impl CommandRunner for ScriptedRunner {
    fn output(&self, program: &str, args: &[&str]) -> Result<String> {
        self.run(program, args, None)
    }

    fn stream(&self, program: &str, args: &[&str]) -> Result<()> {
        self.run(program, args, None).map(|_| ())
    }

    fn stream_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<()> {
        self.run(program, args, Some(input)).map(|_| ())
    }

    fn exists(&self, _program: &str) -> bool {
        true
    }
}

fn workspace<'a>(runner: &'a ScriptedRunner, dir: &Path) -> Workspace<'a> {
    let hosts = dir.join("hosts");
    fs::write(&hosts, "127.0.0.1 localhost\n").unwrap();

    Workspace {
        runner,
        workdir: dir.to_path_buf(),
        platform: Platform {
            os: Os::Linux,
            arch: "x86_64",
        },
        hosts: HostsFile::at(hosts),
        readiness: Readiness {
            timeout: Duration::from_millis(20),
            interval: Duration::from_millis(1),
        },
        check_runtime: false,
        install_dir: Some(dir.join("bin")),
    }
}

#[test]
fn init_update_destroy() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("kindctl.yaml");
    let runner = ScriptedRunner::default();
    let ws = workspace(&runner, dir.path());

    // init writes the default document and creates the cluster
    let outcome = cluster_setup::initialize(&ws, &config_path, false).unwrap();
    assert_eq!(outcome, InitOutcome::Created);
    assert_eq!(runner.count("kind create cluster --name kind-cluster"), 1);

    // enable postgres by editing the document, as a user would
    let mut config = configparser::parse(&config_path).unwrap();
    config.postgres.enabled = true;
    configparser::save(&config_path, &config).unwrap();
    let config = configparser::parse(&config_path).unwrap();

    let installed = deploy::update_cluster(&ws, &config).unwrap();
    assert_eq!(installed, 2);
    assert_eq!(runner.count("helm upgrade --install postgres bitnami/postgresql"), 1);

    // update again converges: same installs, no new hosts lines
    deploy::update_cluster(&ws, &config).unwrap();
    let hosts = fs::read_to_string(dir.path().join("hosts")).unwrap();
    assert_eq!(
        hosts,
        "127.0.0.1 localhost\n127.0.0.1 dashboard.local\n127.0.0.1 postgres.local\n"
    );

    // a second init is a no-op
    let outcome = cluster_setup::initialize(&ws, &config_path, false).unwrap();
    assert_eq!(outcome, InitOutcome::AlreadyExists);
    assert_eq!(runner.count("kind create cluster"), 1);

    cluster_setup::destroy(&ws, &config.cluster.name).unwrap();
    assert_eq!(runner.log().last().map(String::as_str), Some("kind delete cluster --name kind-cluster"));
    assert!(runner.clusters.borrow().is_empty());

    // no transient manifests left behind
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name != "kindctl.yaml" && name.ends_with(".yaml"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn cli_global_flags() {
    let cli = Cli::try_parse_from(["kindctl", "-c", "other.yaml", "-l", "debug", "init", "--resume"])
        .unwrap();

    assert_eq!(cli.config, Path::new("other.yaml"));
    assert_eq!(cli.log_level, Some(LogLevel::Debug));
    assert!(!cli.version);
    assert!(matches!(cli.command, Some(Commands::Init { resume: true })));
}

#[test]
fn cli_defaults() {
    let cli = Cli::try_parse_from(["kindctl", "update"]).unwrap();

    assert_eq!(cli.config, Path::new("kindctl.yaml"));
    assert_eq!(cli.log_level, None);
    assert!(matches!(cli.command, Some(Commands::Update)));
}

#[test]
/// -v works without a subcommand
fn cli_version_flag() {
    let cli = Cli::try_parse_from(["kindctl", "-v"]).unwrap();

    assert!(cli.version);
    assert!(cli.command.is_none());
}

#[test]
/// -v is accepted after a subcommand too
fn cli_version_flag_after_subcommand() {
    let cli = Cli::try_parse_from(["kindctl", "update", "-v"]).unwrap();

    assert!(cli.version);
    assert!(matches!(cli.command, Some(Commands::Update)));
}

#[test]
fn version_requested_before_parsing() {
    assert!(version_requested(["update", "-v"]));
    assert!(version_requested(["-v", "bogus"]));
    assert!(version_requested(["-v", "-l", "loud"]));
    assert!(version_requested(["--version"]));

    assert!(!version_requested(["update"]));
    assert!(!version_requested(["-c", "-v", "update"]));
    assert!(!version_requested(["update", "--", "-v"]));
    assert!(!version_requested(std::iter::empty::<&str>()));
}

#[test]
fn cli_rejects_unknown_level() {
    assert!(Cli::try_parse_from(["kindctl", "-l", "verbose", "update"]).is_err());
}

#[test]
fn version_line() {
    assert_eq!(
        kindctl::commands::version::line(),
        format!("kindctl version: {}", env!("CARGO_PKG_VERSION"))
    );
}
