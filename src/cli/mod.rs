//! CLI module
//!
//! Command-line interface for the Sentry tools.
//!
//! # Commands
//!
//! - one subcommand per tool (`service-info`, `organizations`, `projects`,
//!   `issues`, `issues-details`, `latest-event`, `latest-events`)
//! - `tools` - List tool names and descriptions
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve};
