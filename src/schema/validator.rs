//! Constraint validators
//!
//! One `Validator` per schema type, built once from the type model and
//! immutable afterward. Each variant checks a native value against its
//! own constraints; composite variants (struct, union) only check type
//! identity, since composite contents are validated when each field or
//! payload is assigned.
//!
//! Validators also drive codec dispatch: the wire shape of a value is a
//! function of the validator variant, never of the value alone.

use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use regex::Regex;

use super::errors::{SchemaDefinitionError, SchemaResult, ValidationError, ValidationResult};
use super::types::{StructType, UnionType};
use super::value::Value;

/// Width of an integer type on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntegerWidth {
    pub fn bits(&self) -> u32 {
        match self {
            IntegerWidth::W8 => 8,
            IntegerWidth::W16 => 16,
            IntegerWidth::W32 => 32,
            IntegerWidth::W64 => 64,
        }
    }
}

/// Bounded integer of a fixed width and signedness.
#[derive(Debug, Clone)]
pub struct IntegerValidator {
    width: IntegerWidth,
    signed: bool,
    min: i128,
    max: i128,
}

impl IntegerValidator {
    /// Builds the validator, defaulting unset bounds to the width's
    /// natural range.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if a requested bound falls outside
    /// the natural range or min exceeds max.
    pub fn new(
        width: IntegerWidth,
        signed: bool,
        min_value: Option<i128>,
        max_value: Option<i128>,
    ) -> SchemaResult<Self> {
        let floor = if signed {
            -(1i128 << (width.bits() - 1))
        } else {
            0
        };
        let ceiling = if signed {
            (1i128 << (width.bits() - 1)) - 1
        } else {
            (1i128 << width.bits()) - 1
        };

        let min = min_value.unwrap_or(floor);
        let max = max_value.unwrap_or(ceiling);
        if min < floor {
            return Err(SchemaDefinitionError::MinBelowFloor { min, floor });
        }
        if max > ceiling {
            return Err(SchemaDefinitionError::MaxAboveCeiling { max, ceiling });
        }
        if min > max {
            return Err(SchemaDefinitionError::InvertedBounds);
        }
        Ok(Self {
            width,
            signed,
            min,
            max,
        })
    }

    pub fn width(&self) -> IntegerWidth {
        self.width
    }

    pub fn signed(&self) -> bool {
        self.signed
    }

    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        let n = match value {
            Value::Int(n) => *n,
            other => return Err(ValidationError::wrong_type("an integer", other.type_name())),
        };
        if n < self.min || n > self.max {
            return Err(ValidationError::out_of_range(n, self.min, self.max));
        }
        Ok(())
    }
}

/// Bounded 64-bit float. Integral values are accepted and coerced at
/// encode time.
#[derive(Debug, Clone)]
pub struct FloatValidator {
    min: Option<f64>,
    max: Option<f64>,
}

impl FloatValidator {
    pub fn new(min_value: Option<f64>, max_value: Option<f64>) -> SchemaResult<Self> {
        if let (Some(min), Some(max)) = (min_value, max_value) {
            if min > max {
                return Err(SchemaDefinitionError::InvertedBounds);
            }
        }
        Ok(Self {
            min: min_value,
            max: max_value,
        })
    }

    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        let x = match value {
            Value::Float(x) => *x,
            Value::Int(n) => *n as f64,
            other => return Err(ValidationError::wrong_type("a float", other.type_name())),
        };
        if !x.is_finite() {
            return Err(ValidationError::wrong_type(
                "a finite float",
                "a non-finite float",
            ));
        }
        if let Some(min) = self.min {
            if x < min {
                return Err(ValidationError::out_of_range(x, min, self.max.unwrap_or(f64::MAX)));
            }
        }
        if let Some(max) = self.max {
            if x > max {
                return Err(ValidationError::out_of_range(x, self.min.unwrap_or(f64::MIN), max));
            }
        }
        Ok(())
    }
}

/// Length-bounded, optionally pattern-constrained text.
#[derive(Debug, Clone)]
pub struct StringValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    pattern_source: Option<String>,
}

impl StringValidator {
    /// Builds the validator, compiling `pattern` anchored to the full
    /// value.
    pub fn new(
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<&str>,
    ) -> SchemaResult<Self> {
        if let (Some(min), Some(max)) = (min_length, max_length) {
            if min > max {
                return Err(SchemaDefinitionError::InvertedBounds);
            }
        }
        let compiled = match pattern {
            Some(p) => Some(Regex::new(&format!(r"\A(?:{})\z", p)).map_err(|e| {
                SchemaDefinitionError::InvalidPattern {
                    pattern: p.to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            min_length,
            max_length,
            pattern: compiled,
            pattern_source: pattern.map(str::to_string),
        })
    }

    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        let s = match value {
            Value::Str(s) => s,
            other => return Err(ValidationError::wrong_type("a string", other.type_name())),
        };
        let length = s.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(ValidationError::too_short(length, min));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(ValidationError::too_long(length, max));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                let source = self.pattern_source.as_deref().unwrap_or_default();
                return Err(ValidationError::pattern_mismatch(source));
            }
        }
        Ok(())
    }
}

/// Length-bounded byte sequence.
#[derive(Debug, Clone)]
pub struct BinaryValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl BinaryValidator {
    pub fn new(min_length: Option<usize>, max_length: Option<usize>) -> SchemaResult<Self> {
        if let (Some(min), Some(max)) = (min_length, max_length) {
            if min > max {
                return Err(SchemaDefinitionError::InvertedBounds);
            }
        }
        Ok(Self {
            min_length,
            max_length,
        })
    }

    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        let bytes = match value {
            Value::Bytes(b) => b,
            other => {
                return Err(ValidationError::wrong_type(
                    "a byte sequence",
                    other.type_name(),
                ))
            }
        };
        if let Some(min) = self.min_length {
            if bytes.len() < min {
                return Err(ValidationError::too_short(bytes.len(), min));
            }
        }
        if let Some(max) = self.max_length {
            if bytes.len() > max {
                return Err(ValidationError::too_long(bytes.len(), max));
            }
        }
        Ok(())
    }
}

/// Timestamp carried on the wire as text in a strftime-style format,
/// used symmetrically for encode and decode.
#[derive(Debug, Clone)]
pub struct TimestampValidator {
    format: String,
}

impl TimestampValidator {
    /// Builds the validator, rejecting format strings chrono cannot
    /// render.
    pub fn new(format: &str) -> SchemaResult<Self> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(SchemaDefinitionError::InvalidTimestampFormat {
                format: format.to_string(),
            });
        }
        Ok(Self {
            format: format.to_string(),
        })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        match value {
            Value::Timestamp(_) => Ok(()),
            other => Err(ValidationError::wrong_type(
                "a timestamp",
                other.type_name(),
            )),
        }
    }
}

/// Homogeneous list with item-count bounds. Every item is validated on
/// each pass, including encode of an already-constructed value, since
/// list contents can be mutated after construction.
#[derive(Debug, Clone)]
pub struct ListValidator {
    item: Box<Validator>,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl ListValidator {
    pub fn new(
        item: Validator,
        min_items: Option<usize>,
        max_items: Option<usize>,
    ) -> SchemaResult<Self> {
        if let (Some(min), Some(max)) = (min_items, max_items) {
            if min > max {
                return Err(SchemaDefinitionError::InvertedBounds);
            }
        }
        Ok(Self {
            item: Box::new(item),
            min_items,
            max_items,
        })
    }

    pub fn item(&self) -> &Validator {
        &self.item
    }

    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        let items = match value {
            Value::List(items) => items,
            other => return Err(ValidationError::wrong_type("a list", other.type_name())),
        };
        self.check_count(items.len())?;
        for (i, item) in items.iter().enumerate() {
            self.item.validate(item).map_err(|e| e.at_index(i))?;
        }
        Ok(())
    }

    pub(crate) fn check_count(&self, count: usize) -> ValidationResult<()> {
        if let Some(min) = self.min_items {
            if count < min {
                return Err(ValidationError::too_short(count, min));
            }
        }
        if let Some(max) = self.max_items {
            if count > max {
                return Err(ValidationError::too_long(count, max));
            }
        }
        Ok(())
    }
}

/// An executable representation of one schema type's constraints, usable
/// both for validation and for codec dispatch.
#[derive(Debug, Clone)]
pub enum Validator {
    Boolean,
    Integer(IntegerValidator),
    Float(FloatValidator),
    String(StringValidator),
    Binary(BinaryValidator),
    Timestamp(TimestampValidator),
    /// Opaque passthrough; always validates
    Any,
    /// Payload-free union variant marker
    Symbol,
    /// The distinguished null type
    Null,
    List(ListValidator),
    /// Wraps an inner validator; an absent value is valid. Never nests.
    Nullable(Box<Validator>),
    Struct(Arc<StructType>),
    Union(Arc<UnionType>),
}

impl Validator {
    pub fn string(
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<&str>,
    ) -> SchemaResult<Self> {
        Ok(Validator::String(StringValidator::new(
            min_length, max_length, pattern,
        )?))
    }

    pub fn integer(
        width: IntegerWidth,
        signed: bool,
        min_value: Option<i128>,
        max_value: Option<i128>,
    ) -> SchemaResult<Self> {
        Ok(Validator::Integer(IntegerValidator::new(
            width, signed, min_value, max_value,
        )?))
    }

    pub fn int32(min_value: Option<i128>, max_value: Option<i128>) -> SchemaResult<Self> {
        Self::integer(IntegerWidth::W32, true, min_value, max_value)
    }

    pub fn int64(min_value: Option<i128>, max_value: Option<i128>) -> SchemaResult<Self> {
        Self::integer(IntegerWidth::W64, true, min_value, max_value)
    }

    pub fn uint32(min_value: Option<i128>, max_value: Option<i128>) -> SchemaResult<Self> {
        Self::integer(IntegerWidth::W32, false, min_value, max_value)
    }

    pub fn uint64(min_value: Option<i128>, max_value: Option<i128>) -> SchemaResult<Self> {
        Self::integer(IntegerWidth::W64, false, min_value, max_value)
    }

    pub fn float(min_value: Option<f64>, max_value: Option<f64>) -> SchemaResult<Self> {
        Ok(Validator::Float(FloatValidator::new(min_value, max_value)?))
    }

    pub fn binary(min_length: Option<usize>, max_length: Option<usize>) -> SchemaResult<Self> {
        Ok(Validator::Binary(BinaryValidator::new(
            min_length, max_length,
        )?))
    }

    pub fn timestamp(format: &str) -> SchemaResult<Self> {
        Ok(Validator::Timestamp(TimestampValidator::new(format)?))
    }

    pub fn list(
        item: Validator,
        min_items: Option<usize>,
        max_items: Option<usize>,
    ) -> SchemaResult<Self> {
        Ok(Validator::List(ListValidator::new(
            item, min_items, max_items,
        )?))
    }

    /// Wraps `inner` so an absent value validates.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if `inner` is itself nullable; the
    /// wire format cannot represent two layers of absence.
    pub fn nullable(inner: Validator) -> SchemaResult<Self> {
        if matches!(inner, Validator::Nullable(_)) {
            return Err(SchemaDefinitionError::NestedNullable);
        }
        Ok(Validator::Nullable(Box::new(inner)))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Validator::Nullable(_))
    }

    /// Validates `value` against this validator's constraints.
    ///
    /// Struct and union validators check type identity only; their
    /// contents were validated when each field or payload was assigned.
    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        match self {
            Validator::Boolean => match value {
                Value::Bool(_) => Ok(()),
                other => Err(ValidationError::wrong_type("a boolean", other.type_name())),
            },
            Validator::Integer(v) => v.validate(value),
            Validator::Float(v) => v.validate(value),
            Validator::String(v) => v.validate(value),
            Validator::Binary(v) => v.validate(value),
            Validator::Timestamp(v) => v.validate(value),
            Validator::Any => Ok(()),
            Validator::Symbol => match value {
                Value::Null => Ok(()),
                other => Err(ValidationError::wrong_type(
                    "no value (symbol variants carry none)",
                    other.type_name(),
                )),
            },
            Validator::Null => match value {
                Value::Null => Ok(()),
                other => Err(ValidationError::wrong_type("null", other.type_name())),
            },
            Validator::List(v) => v.validate(value),
            Validator::Nullable(inner) => match value {
                Value::Null => Ok(()),
                other => inner.validate(other),
            },
            Validator::Struct(ty) => match value {
                Value::Struct(sv) if sv.struct_type().conforms_to(ty) => Ok(()),
                Value::Struct(sv) => Err(ValidationError::wrong_type(
                    format!("struct '{}'", ty.name()),
                    format!("struct '{}'", sv.struct_type().name()),
                )),
                other => Err(ValidationError::wrong_type(
                    format!("struct '{}'", ty.name()),
                    other.type_name(),
                )),
            },
            Validator::Union(ty) => match value {
                Value::Union(uv) if uv.union_type().conforms_to(ty) => Ok(()),
                Value::Union(uv) => Err(ValidationError::wrong_type(
                    format!("union '{}'", ty.name()),
                    format!("union '{}'", uv.union_type().name()),
                )),
                other => Err(ValidationError::wrong_type(
                    format!("union '{}'", ty.name()),
                    other.type_name(),
                )),
            },
        }
    }
}
