/**
 * Natural Expression CLI
 *
 * Configuration loading and subcommands behind the `nexpr` binary
 */
pub mod commands;
pub mod config;

pub use commands::DataSource;
pub use config::CliConfig;
