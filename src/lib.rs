//! wirespec - a strict, deterministic IDL front end and JSON wire-format runtime
//!
//! The spec language is tokenized by [`lexer`], parsed into a typed model
//! (structs, tagged unions, routes) consumed through [`schema`], and
//! values move to and from the JSON wire format through [`codec`].

pub mod cli;
pub mod codec;
pub mod lexer;
pub mod schema;
