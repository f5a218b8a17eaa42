//! CLI module for wirespec
//!
//! Provides the command-line interface:
//! - lex: tokenize a spec file and print the token stream

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{lex_file, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
