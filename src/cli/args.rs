//! CLI argument definitions using clap
//!
//! Commands:
//! - wirespec lex <file> [--json]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wirespec - A strict, deterministic IDL front end and JSON wire-format runtime
#[derive(Parser, Debug)]
#[command(name = "wirespec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Tokenize a spec file and print the token stream
    Lex {
        /// Path to the spec file
        file: PathBuf,

        /// Print the stream as JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
