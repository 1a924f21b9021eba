//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CRM bridge CLI
#[derive(Parser, Debug)]
#[command(name = "crm-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Remote webhook URL (overrides config and environment)
    #[arg(long, global = true)]
    pub webhook: Option<String>,

    /// Proxy endpoint URL (overrides config and environment)
    #[arg(long, global = true)]
    pub proxy_url: Option<String>,

    /// Never fall back to the proxy
    #[arg(long, global = true)]
    pub no_proxy: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every task assigned to a user
    Tasks {
        /// Remote user id
        #[arg(long, conflicts_with = "external_id")]
        user_id: Option<String>,

        /// External identity resolved through `user_mapping`
        #[arg(long)]
        external_id: Option<String>,
    },

    /// Perform a single remote call
    Call {
        /// Remote method name (e.g. `profile`)
        method: String,

        /// Inline params JSON
        #[arg(long)]
        params_json: Option<String>,
    },

    /// Fetch every element of a list
    Lists {
        /// List identifier
        #[arg(long)]
        iblock_id: String,

        /// List-type ids to try (repeatable; defaults to all known types)
        #[arg(long = "type-id")]
        type_ids: Vec<String>,
    },

    /// Test connectivity to the remote API
    Check,

    /// Start the proxy server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
