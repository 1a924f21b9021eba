//! CLI module
//!
//! Command-line interface for fetching collections and running the proxy.
//!
//! # Commands
//!
//! - `tasks` - Fetch every task assigned to a user
//! - `call` - Perform a single remote call
//! - `lists` - Fetch every element of a list
//! - `check` - Test connectivity to the remote API
//! - `serve` - Start the proxy server

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig, ALLOWED_METHODS};
