//! Lexer Invariant Tests
//!
//! Tests for tokenization invariants:
//! - Token lines are monotonically non-decreasing
//! - INDENT/DEDENT only appear in a contiguous run after a NEWLINE or at
//!   end of input
//! - Every opened block is closed by end of stream
//! - Bad characters are batched, never fatal
//! - Bad indentation is fatal

use wirespec::lexer::{tokenize, LexError, TokenKind};

const SAMPLE_SPEC: &str = "\
namespace accounts

# The core account record.
struct Account extends Record
    attrs
        internal = true
    id String # primary key
    age UInt64 = 21
    ratio Float64
    tags List of String

union Status
    active
    suspended
    other *

route /account/info (Account, Status)
    deprecated
";

// =============================================================================
// Stream Shape Invariants
// =============================================================================

/// Token lines never decrease across the stream.
#[test]
fn test_lines_monotonic() {
    let (tokens, errors) = tokenize(SAMPLE_SPEC).unwrap();
    assert!(errors.is_empty());
    let mut last = 0;
    for token in &tokens {
        assert!(
            token.line >= last,
            "line decreased at token {:?} (was {})",
            token,
            last
        );
        last = token.line;
    }
}

/// INDENT/DEDENT tokens always follow a NEWLINE (or another dent in the
/// same run); they never appear mid-line.
#[test]
fn test_dents_follow_newlines() {
    let (tokens, _) = tokenize(SAMPLE_SPEC).unwrap();
    for (i, token) in tokens.iter().enumerate() {
        if matches!(token.kind, TokenKind::Indent | TokenKind::Dedent) {
            let prev = &tokens[i - 1];
            assert!(
                matches!(
                    prev.kind,
                    TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
                ),
                "dent at {} follows {:?}",
                i,
                prev
            );
        }
    }
}

/// Every INDENT is balanced by a DEDENT by end of stream.
#[test]
fn test_blocks_balanced() {
    let (tokens, _) = tokenize(SAMPLE_SPEC).unwrap();
    let mut depth: i64 = 0;
    for token in &tokens {
        match token.kind {
            TokenKind::Indent => depth += 1,
            TokenKind::Dedent => {
                depth -= 1;
                assert!(depth >= 0, "dedent below zero");
            }
            _ => {}
        }
    }
    assert_eq!(depth, 0, "unclosed blocks at end of stream");
}

/// A file ending inside nested blocks still closes every level.
#[test]
fn test_eof_closes_nested_blocks() {
    let (tokens, _) = tokenize("a\n    b\n        c").unwrap();
    let dedents = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Dedent)
        .count();
    assert_eq!(dedents, 2);
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Dedent);
}

// =============================================================================
// Reserved Word Mapping
// =============================================================================

/// Reserved words with grammar significance get dedicated kinds; the
/// rest become KEYWORD tokens.
#[test]
fn test_reserved_word_kinds() {
    let (tokens, _) = tokenize(SAMPLE_SPEC).unwrap();
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Struct));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Extends));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Attrs));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Union));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Route));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Deprecated));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Of));
    assert!(tokens
        .iter()
        .any(|t| t.kind == TokenKind::Keyword && t.text() == Some("namespace")));
}

/// The route path lexes as a single PATH token.
#[test]
fn test_route_path() {
    let (tokens, _) = tokenize(SAMPLE_SPEC).unwrap();
    let path = tokens.iter().find(|t| t.kind == TokenKind::Path).unwrap();
    assert_eq!(path.text(), Some("/account/info"));
}

// =============================================================================
// Comment Handling
// =============================================================================

/// A trailing comment still yields the line's NEWLINE; a full-line
/// comment yields nothing.
#[test]
fn test_comment_newline_preservation() {
    // "id String # primary key" must still end its line
    let (tokens, _) = tokenize("id String # primary key\nage UInt64\n").unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Id,
            TokenKind::Id,
            TokenKind::Newline,
            TokenKind::Id,
            TokenKind::Id,
            TokenKind::Newline,
        ]
    );

    let (tokens, _) = tokenize("# just a comment\n").unwrap();
    assert!(tokens.is_empty());
}

// =============================================================================
// Error Policy
// =============================================================================

/// Bad characters are collected with their line numbers and the stream
/// keeps going.
#[test]
fn test_bad_characters_batched() {
    let (tokens, errors) = tokenize("a $\nb ;\n").unwrap();
    assert_eq!(errors, vec![('$', 1), (';', 2)]);
    let ids = tokens.iter().filter(|t| t.kind == TokenKind::Id).count();
    assert_eq!(ids, 2);
}

/// An indentation step that is not a multiple of 4 aborts tokenization.
#[test]
fn test_three_space_indent_fatal() {
    let result = tokenize("struct A\n   id String\n");
    assert!(matches!(
        result,
        Err(LexError::IndentNotAligned { width: 3, line: 2 })
    ));
}

/// The sample spec tokenizes clean end to end.
#[test]
fn test_sample_spec_clean() {
    let (tokens, errors) = tokenize(SAMPLE_SPEC).unwrap();
    assert!(errors.is_empty());
    assert!(tokens.len() > 30);
}
