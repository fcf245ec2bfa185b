//! Command-line interface for dbforge.
//!
//! One command: provision the configured database container and report the
//! outcome.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};
