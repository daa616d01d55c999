//! CLI command definitions for the `showroom` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod seed;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Conversational product catalog.
#[derive(Parser)]
#[command(name = "showroom", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "SHOWROOM_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP transport.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Chat with the catalog in the terminal.
    Chat {
        /// User id to chat as (must be listed in admin_ids for the admin panel).
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Create categories and subcategories from a TOML file.
    Seed {
        /// Path to the seed file.
        file: PathBuf,
    },

    /// Show catalog and configuration status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_user() {
        let cli = Cli::parse_from(["showroom", "chat", "--user", "1001"]);
        assert!(matches!(cli.command, Commands::Chat { user } if user == "1001"));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["showroom", "-vv", "--json", "serve", "--port", "8080"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Serve { port: 8080, .. }));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
