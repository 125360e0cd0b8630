//! CLI command definitions for the `chattlin` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod kv;
pub mod relay;
pub mod version;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use kv::KvCommand;
use relay::RelayCommand;

/// Chattlin widget services: version checks, analytics bridge and relay tooling.
#[derive(Parser)]
#[command(name = "chattlin", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "CHATTLIN_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server with the version-check schedule and the
    /// analytics bridge.
    Serve {
        /// Port to listen on. Defaults to `server.port` from config.toml.
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to. Defaults to `server.host` from config.toml.
        #[arg(long)]
        host: Option<String>,

        /// Keep the key-value store in memory instead of SQLite.
        #[arg(long)]
        in_memory: bool,
    },

    /// Ask the release hub for the latest version now.
    CheckVersion,

    /// Show the running version and the latest recorded one.
    Version,

    /// Inspect the installation-wide key-value store.
    Kv {
        #[command(subcommand)]
        command: KvCommand,
    },

    /// Encode, decode and simulate host/frame relay messages.
    Relay {
        #[command(subcommand)]
        command: RelayCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["chattlin", "-vv", "serve", "--port", "8080", "--in-memory"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve {
                port,
                host,
                in_memory,
            } => {
                assert_eq!(port, Some(8080));
                assert!(host.is_none());
                assert!(in_memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_json_after_subcommand() {
        let cli = Cli::parse_from(["chattlin", "kv", "list", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Kv { command: KvCommand::List }));
    }
}
