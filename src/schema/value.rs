//! Native runtime values
//!
//! `Value` is the closed set of things the runtime validates and
//! serializes. Composite values carry their type descriptor, so type
//! identity checks are a pointer walk rather than reflection, and field
//! assignment can validate through the declared field validators at set
//! time.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{ValidationError, ValidationKind, ValidationResult};
use super::types::{StructType, UnionType};
use super::validator::Validator;

/// A native value as seen by validators and the codec.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The distinguished null sentinel; also represents "absent" for
    /// nullable slots
    Null,
    Bool(bool),
    /// Wide enough for every integer width up to unsigned 64-bit
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    List(Vec<Value>),
    Struct(StructValue),
    Union(UnionValue),
}

impl Value {
    /// Returns the value's type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "binary",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
            Value::Union(_) => "union",
        }
    }
}

/// An instance of a struct type.
///
/// Fields are validated as they are set, so a stored instance only ever
/// holds values that passed their field validators. Reading a field that
/// was never set falls back to the declared default, if any.
#[derive(Debug, Clone)]
pub struct StructValue {
    ty: Arc<StructType>,
    values: HashMap<String, Value>,
}

impl StructValue {
    /// Creates an instance with no fields set.
    pub fn new(ty: Arc<StructType>) -> Self {
        Self {
            ty,
            values: HashMap::new(),
        }
    }

    pub fn struct_type(&self) -> &Arc<StructType> {
        &self.ty
    }

    /// Validates and assigns a field.
    ///
    /// Composite fields get a type-identity check through their
    /// validator; everything else is fully validated. Assigning null to
    /// a nullable field clears it instead.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an undeclared field or a value that
    /// fails the field's validator.
    pub fn set(&mut self, field: &str, value: Value) -> ValidationResult<()> {
        let spec = self
            .ty
            .field(field)
            .ok_or_else(|| ValidationError::unknown_field(field))?;
        if spec.validator.is_nullable() && value == Value::Null {
            self.values.remove(field);
            return Ok(());
        }
        spec.validator.validate(&value).map_err(|e| e.at(field))?;
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Clears a field back to unset.
    pub fn clear(&mut self, field: &str) {
        self.values.remove(field);
    }

    /// Returns the set value, else the declared default, else `None`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .get(field)
            .or_else(|| self.ty.field(field)?.default.as_ref())
    }

    /// Whether the field was explicitly set.
    pub fn is_set(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// The explicitly set value only, with no default fallback.
    pub(crate) fn raw(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.values == other.values
    }
}

/// An instance of a union type: an active tag and an optional payload.
#[derive(Debug, Clone)]
pub struct UnionValue {
    ty: Arc<UnionType>,
    tag: String,
    value: Option<Box<Value>>,
}

impl UnionValue {
    /// Constructs a union with the given active tag, validating the
    /// payload against the tag's validator.
    ///
    /// Symbol and Any variants must be constructed without a payload. A
    /// missing payload is otherwise only legal for a nullable tag
    /// validator.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an unknown tag or a payload that
    /// fails the tag's validator.
    pub fn new(ty: Arc<UnionType>, tag: &str, value: Option<Value>) -> ValidationResult<Self> {
        let variant = ty
            .variant(tag)
            .ok_or_else(|| ValidationError::unknown_variant(tag))?;
        match &variant.validator {
            Validator::Symbol | Validator::Any => {
                if value.is_some() {
                    return Err(ValidationError::new(
                        ValidationKind::WrongType,
                        format!("variant '{}' does not carry a value", tag),
                    )
                    .at(tag));
                }
            }
            validator => match &value {
                Some(v) => validator.validate(v).map_err(|e| e.at(tag))?,
                None => {
                    if !validator.is_nullable() {
                        return Err(ValidationError::missing_value(tag));
                    }
                }
            },
        }
        Ok(Self {
            ty,
            tag: tag.to_string(),
            value: value.map(Box::new),
        })
    }

    /// Constructs a payload-free (symbol) instance.
    pub fn symbol(ty: Arc<UnionType>, tag: &str) -> ValidationResult<Self> {
        Self::new(ty, tag, None)
    }

    pub fn union_type(&self) -> &Arc<UnionType> {
        &self.ty
    }

    /// The active tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The payload, if the active variant carries one.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_deref()
    }

    /// Whether `tag` is the active tag.
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }
}

impl PartialEq for UnionValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.tag == other.tag && self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{FieldSpec, Variant};

    fn account() -> Arc<StructType> {
        StructType::new(
            "Account",
            None,
            vec![
                FieldSpec::new("id", Validator::string(Some(1), None, None).unwrap()),
                FieldSpec::with_default(
                    "plan",
                    Validator::string(None, None, None).unwrap(),
                    Value::Str("free".into()),
                ),
                FieldSpec::new(
                    "note",
                    Validator::nullable(Validator::string(None, None, None).unwrap()).unwrap(),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_set_validates() {
        let mut account = StructValue::new(account());
        assert!(account.set("id", Value::Str("a1".into())).is_ok());
        let err = account.set("id", Value::Str("".into())).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::TooShort);
        assert_eq!(err.path(), Some("id"));
    }

    #[test]
    fn test_set_unknown_field() {
        let mut account = StructValue::new(account());
        assert_eq!(
            account
                .set("nope", Value::Str("x".into()))
                .unwrap_err()
                .kind(),
            ValidationKind::UnknownField
        );
    }

    #[test]
    fn test_get_falls_back_to_default() {
        let mut account = StructValue::new(account());
        assert_eq!(account.get("plan"), Some(&Value::Str("free".into())));
        account.set("plan", Value::Str("pro".into())).unwrap();
        assert_eq!(account.get("plan"), Some(&Value::Str("pro".into())));
        assert_eq!(account.get("id"), None);
    }

    #[test]
    fn test_null_clears_nullable_field() {
        let mut account = StructValue::new(account());
        account.set("note", Value::Str("hi".into())).unwrap();
        assert!(account.is_set("note"));
        account.set("note", Value::Null).unwrap();
        assert!(!account.is_set("note"));
    }

    #[test]
    fn test_null_rejected_for_required_field() {
        let mut account = StructValue::new(account());
        assert!(account.set("id", Value::Null).is_err());
    }

    fn power() -> Arc<UnionType> {
        UnionType::new(
            "PowerLevel",
            None,
            vec![
                Variant::new("exact", Validator::int64(None, None).unwrap()),
                Variant::new("unknown", Validator::Symbol),
                Variant::new(
                    "estimate",
                    Validator::nullable(Validator::int64(None, None).unwrap()).unwrap(),
                ),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_union_payload_validated() {
        let u = UnionValue::new(power(), "exact", Some(Value::Int(9000))).unwrap();
        assert!(u.is("exact"));
        assert_eq!(u.value(), Some(&Value::Int(9000)));

        let err = UnionValue::new(power(), "exact", Some(Value::Str("x".into()))).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::WrongType);
        assert_eq!(err.path(), Some("exact"));
    }

    #[test]
    fn test_union_symbol_takes_no_payload() {
        assert!(UnionValue::symbol(power(), "unknown").is_ok());
        assert!(UnionValue::new(power(), "unknown", Some(Value::Int(1))).is_err());
    }

    #[test]
    fn test_union_missing_payload() {
        assert_eq!(
            UnionValue::new(power(), "exact", None).unwrap_err().kind(),
            ValidationKind::MissingValue
        );
        // nullable tag validator permits an absent payload
        assert!(UnionValue::new(power(), "estimate", None).is_ok());
    }

    #[test]
    fn test_union_unknown_tag() {
        assert_eq!(
            UnionValue::symbol(power(), "nope").unwrap_err().kind(),
            ValidationKind::UnknownVariant
        );
    }
}
