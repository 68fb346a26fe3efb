//! CLI module
//!
//! Argument parsing and conversion into the engine's configuration
//! structs. Every flag has an environment-variable fallback so the tool
//! can be driven entirely from a `.env` file, matching unattended
//! operation.

pub mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments (and environment fallbacks)
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
