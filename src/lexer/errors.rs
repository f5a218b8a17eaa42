//! Lexer error types
//!
//! Only impossible indentation is fatal. Unrecognized characters are
//! collected as `(character, line)` pairs on the lexer itself and never
//! abort tokenization; callers must consult them after draining the
//! stream.

use thiserror::Error;

/// Result type for lexer operations
pub type LexResult<T> = Result<T, LexError>;

/// Fatal tokenization failure; the token stream aborts at the point of
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A line is indented by a width that is not a multiple of 4
    #[error("indent of {width} spaces at line {line} is not a multiple of 4")]
    IndentNotAligned { width: usize, line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_error_display() {
        let err = LexError::IndentNotAligned { width: 3, line: 7 };
        let display = format!("{}", err);
        assert!(display.contains("3 spaces"));
        assert!(display.contains("line 7"));
    }
}
