//! Schema error types
//!
//! Two phases, two types:
//! - `SchemaDefinitionError`: a validator or type descriptor could not be
//!   built. This indicates a malformed schema, not a malformed value, and
//!   is raised once at construction time.
//! - `ValidationError`: a value failed a constraint at validate, encode,
//!   or decode time. It carries the failed constraint and enough path
//!   context to localize the failure.

use std::fmt;
use thiserror::Error;

/// Result type for validator and type construction
pub type SchemaResult<T> = Result<T, SchemaDefinitionError>;

/// Result type for value validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Invalid validator or type-descriptor construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaDefinitionError {
    /// Requested minimum is below the integer width's natural floor
    #[error("minimum value {min} is below the natural floor {floor} of the integer type")]
    MinBelowFloor { min: i128, floor: i128 },

    /// Requested maximum is above the integer width's natural ceiling
    #[error("maximum value {max} is above the natural ceiling {ceiling} of the integer type")]
    MaxAboveCeiling { max: i128, ceiling: i128 },

    /// Minimum bound exceeds maximum bound
    #[error("minimum bound exceeds maximum bound")]
    InvertedBounds,

    /// String pattern failed to compile
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Timestamp format string is not a valid strftime pattern
    #[error("invalid timestamp format '{format}'")]
    InvalidTimestampFormat { format: String },

    /// Nullable wrapping another nullable has no wire representation
    #[error("nullable validators cannot be nested")]
    NestedNullable,

    /// A field name appears twice across a struct's effective field list
    #[error("duplicate field '{field}' in struct '{name}'")]
    DuplicateField { name: String, field: String },

    /// A tag appears twice among a union's own variants
    #[error("duplicate variant tag '{tag}' in union '{name}'")]
    DuplicateVariant { name: String, tag: String },

    /// The catch-all tag names no variant of the union
    #[error("catch-all tag '{tag}' is not a variant of union '{name}'")]
    UnknownCatchAllTag { name: String, tag: String },

    /// The catch-all variant must be constructible without a payload
    #[error("catch-all tag '{tag}' of union '{name}' must be a symbol or any variant")]
    InvalidCatchAllTag { name: String, tag: String },
}

/// The constraint a value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Value is not of the validator's type
    WrongType,
    /// Length or item count under the minimum
    TooShort,
    /// Length or item count over the maximum
    TooLong,
    /// Numeric value outside the permitted range
    OutOfRange,
    /// String does not match the configured pattern
    PatternMismatch,
    /// Text does not parse under the configured format
    FormatMismatch,
    /// Required struct field absent from decode input
    MissingField,
    /// Struct field not declared by the schema (strict decode)
    UnknownField,
    /// Union tag not declared by the schema
    UnknownVariant,
    /// Required field or payload has no value at encode time
    MissingValue,
}

/// Value validation failure with path context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    kind: ValidationKind,
    path: Option<String>,
    message: String,
}

impl ValidationError {
    /// Create a validation error with no path context.
    pub fn new(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            message: message.into(),
        }
    }

    pub fn wrong_type(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::new(
            ValidationKind::WrongType,
            format!("expected {}, got {}", expected, actual),
        )
    }

    pub fn too_short(actual: usize, min: usize) -> Self {
        Self::new(
            ValidationKind::TooShort,
            format!("length {} is under the minimum {}", actual, min),
        )
    }

    pub fn too_long(actual: usize, max: usize) -> Self {
        Self::new(
            ValidationKind::TooLong,
            format!("length {} is over the maximum {}", actual, max),
        )
    }

    pub fn out_of_range(
        value: impl fmt::Display,
        min: impl fmt::Display,
        max: impl fmt::Display,
    ) -> Self {
        Self::new(
            ValidationKind::OutOfRange,
            format!("{} is outside the range [{}, {}]", value, min, max),
        )
    }

    pub fn pattern_mismatch(pattern: &str) -> Self {
        Self::new(
            ValidationKind::PatternMismatch,
            format!("value does not match pattern '{}'", pattern),
        )
    }

    pub fn format_mismatch(reason: impl fmt::Display) -> Self {
        Self::new(ValidationKind::FormatMismatch, reason.to_string())
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(ValidationKind::MissingField, "required field is missing").at(field)
    }

    pub fn unknown_field(field: &str) -> Self {
        Self::new(ValidationKind::UnknownField, "field is not declared").at(field)
    }

    pub fn unknown_variant(tag: &str) -> Self {
        Self::new(
            ValidationKind::UnknownVariant,
            format!("unknown union tag '{}'", tag),
        )
    }

    pub fn missing_value(field: &str) -> Self {
        Self::new(ValidationKind::MissingValue, "required field has no value").at(field)
    }

    /// Prefix the failure path with a field or tag name.
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        self.path = Some(match self.path.take() {
            Some(rest) if rest.starts_with('[') => format!("{}{}", segment, rest),
            Some(rest) => format!("{}.{}", segment, rest),
            None => segment,
        });
        self
    }

    /// Prefix the failure path with a list index.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path = Some(match self.path.take() {
            Some(rest) if rest.starts_with('[') => format!("[{}]{}", index, rest),
            Some(rest) => format!("[{}].{}", index, rest),
            None => format!("[{}]", index),
        });
        self
    }

    /// Returns the failed constraint.
    pub fn kind(&self) -> ValidationKind {
        self.kind
    }

    /// Returns the field/tag path of the failure, if one applies.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "'{}': {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}
