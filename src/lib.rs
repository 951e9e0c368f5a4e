pub mod addons;
pub mod cli;
pub mod clients;
pub mod cluster_setup;
pub mod commands;
pub mod configparser;
pub mod deploy;
pub mod errors;
pub mod hosts;
pub mod prereqs;
pub mod runner;
pub mod templates;
pub mod utils;
pub mod workspace;

#[cfg(test)]
mod tests;
