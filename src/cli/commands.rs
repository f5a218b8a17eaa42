//! CLI command implementations
//!
//! Commands are thin wrappers over the library: read a file, drive the
//! lexer, print results. All policy (what is fatal, what is batched)
//! lives in the lexer itself.

use std::fs;
use std::path::Path;

use crate::lexer::Lexer;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and dispatch.
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Dispatch an already-parsed command.
pub fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Lex { file, json } => lex_file(&file, json),
    }
}

/// Tokenize `path` and print the stream.
///
/// Bad characters do not stop tokenization; they are printed to stderr
/// after the stream and reported as a non-zero exit.
pub fn lex_file(path: &Path, json: bool) -> CliResult<()> {
    let source = fs::read_to_string(path)?;

    let mut lexer = Lexer::new(&source);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => break,
            Err(e) => return Err(CliError::lex_failed(e.to_string())),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if !lexer.errors().is_empty() {
        for (character, line) in lexer.errors() {
            eprintln!("bad character {:?} at line {}", character, line);
        }
        return Err(CliError::bad_characters(lexer.errors().len()));
    }
    Ok(())
}
