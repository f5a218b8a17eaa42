//! Token types emitted by the spec lexer
//!
//! A token is the smallest unit of lexical output: a kind, an optional
//! literal payload, and the source position it was scanned at. Block
//! structure is encoded in the stream itself via INDENT/DEDENT/NEWLINE
//! tokens, so the parser never has to look at whitespace.

use serde::Serialize;
use std::fmt;

/// Kinds of tokens produced by the lexer.
///
/// Reserved words with grammar significance get dedicated kinds; the
/// remaining keywords are emitted as `Keyword` carrying their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// Identifier: `[a-zA-Z_][a-zA-Z0-9_-]*`
    Id,
    /// A reserved word without a dedicated kind (e.g. `doc`, `example`)
    Keyword,
    /// Route path: `/[/a-zA-Z0-9_-]*`
    Path,
    Pipe,
    Dot,
    /// One block level opened (4 spaces)
    Indent,
    /// One block level closed
    Dedent,
    /// One or more consecutive line breaks
    Newline,
    Comma,
    Eq,
    LParen,
    RParen,
    Boolean,
    Float,
    Integer,
    /// The literal `null`, distinct from an absent value
    Null,
    String,
    Asterisk,
    Question,
    Deprecated,
    Extends,
    Attrs,
    Include,
    Of,
    Pass,
    Route,
    Struct,
    Union,
}

impl TokenKind {
    /// Returns the token kind name for display and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Id => "ID",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Path => "PATH",
            TokenKind::Pipe => "PIPE",
            TokenKind::Dot => "DOT",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Comma => "COMMA",
            TokenKind::Eq => "EQ",
            TokenKind::LParen => "LPAR",
            TokenKind::RParen => "RPAR",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Float => "FLOAT",
            TokenKind::Integer => "INTEGER",
            TokenKind::Null => "NULL",
            TokenKind::String => "STRING",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Question => "QUESTION",
            TokenKind::Deprecated => "DEPRECATED",
            TokenKind::Extends => "EXTENDS",
            TokenKind::Attrs => "ATTRS",
            TokenKind::Include => "INCLUDE",
            TokenKind::Of => "OF",
            TokenKind::Pass => "PASS",
            TokenKind::Route => "ROUTE",
            TokenKind::Struct => "STRUCT",
            TokenKind::Union => "UNION",
        }
    }
}

/// Literal payload carried by a token.
///
/// Structural and punctuation tokens carry `None`. The `Null` variant is
/// the distinguished null sentinel from source text, which is not the same
/// thing as a token having no payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenValue {
    None,
    Text(String),
    Bool(bool),
    Int(u64),
    Float(f64),
    Null,
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::None => Ok(()),
            TokenValue::Text(t) => write!(f, "{:?}", t),
            TokenValue::Bool(b) => write!(f, "{}", b),
            TokenValue::Int(n) => write!(f, "{}", n),
            TokenValue::Float(x) => write!(f, "{}", x),
            TokenValue::Null => write!(f, "null"),
        }
    }
}

/// A single unit of lexical output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// Token kind
    pub kind: TokenKind,
    /// Literal payload, if the kind carries one
    pub value: TokenValue,
    /// 1-based source line the token starts on
    pub line: usize,
    /// Character offset into the source the token starts at
    pub pos: usize,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, value: TokenValue, line: usize, pos: usize) -> Self {
        Self {
            kind,
            value,
            line,
            pos,
        }
    }

    /// Returns the payload text for kinds that carry one.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::None => write!(f, "{}:{} {}", self.line, self.pos, self.kind.name()),
            value => write!(f, "{}:{} {} {}", self.line, self.pos, self.kind.name(), value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(TokenKind::Id.name(), "ID");
        assert_eq!(TokenKind::LParen.name(), "LPAR");
        assert_eq!(TokenKind::Asterisk.name(), "ASTERISK");
        assert_eq!(TokenKind::Struct.name(), "STRUCT");
    }

    #[test]
    fn test_display_with_payload() {
        let token = Token::new(TokenKind::Integer, TokenValue::Int(42), 3, 17);
        assert_eq!(format!("{}", token), "3:17 INTEGER 42");
    }

    #[test]
    fn test_display_without_payload() {
        let token = Token::new(TokenKind::Newline, TokenValue::None, 1, 0);
        assert_eq!(format!("{}", token), "1:0 NEWLINE");
    }

    #[test]
    fn test_text_accessor() {
        let token = Token::new(
            TokenKind::Id,
            TokenValue::Text("account_id".into()),
            1,
            0,
        );
        assert_eq!(token.text(), Some("account_id"));
        assert_eq!(
            Token::new(TokenKind::Comma, TokenValue::None, 1, 0).text(),
            None
        );
    }
}
