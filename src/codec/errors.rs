//! Codec error types
//!
//! A decode input can fail two ways: the JSON itself is not the shape
//! the validator calls for (`WireFormatError`), or the shape is right
//! but a value inside it violates a constraint (`ValidationError`).
//! `CodecError` is the union of the two that encode/decode return.

use thiserror::Error;

use crate::schema::ValidationError;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Input that is structurally wrong before any constraint applies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireFormatError {
    /// Input text failed to parse as JSON
    #[error("input is not valid JSON: {0}")]
    MalformedJson(String),

    /// A union decodes from a string or a single-key object, nothing else
    #[error("a union must be a string or a single-key object, got {0}")]
    BadUnionShape(String),

    /// A union object carries exactly one tag
    #[error("a union object must have exactly one key, got {0}")]
    MultiKeyUnion(usize),

    /// JSON shape that an `any` validator has no native mapping for
    #[error("no native mapping for a JSON {0} under an any validator")]
    UnsupportedAny(&'static str),
}

/// Any failure reported by encode or decode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Wire(#[from] WireFormatError),
}

impl CodecError {
    /// Prefix validation-path context with a field or tag name.
    pub(crate) fn at(self, segment: &str) -> Self {
        match self {
            CodecError::Validation(e) => CodecError::Validation(e.at(segment)),
            wire => wire,
        }
    }

    /// Prefix validation-path context with a list index.
    pub(crate) fn at_index(self, index: usize) -> Self {
        match self {
            CodecError::Validation(e) => CodecError::Validation(e.at_index(index)),
            wire => wire,
        }
    }

    /// The validation failure, when that is what this error is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CodecError::Validation(e) => Some(e),
            CodecError::Wire(_) => None,
        }
    }
}
