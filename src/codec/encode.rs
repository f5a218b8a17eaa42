//! JSON encoding
//!
//! `encode` converts a native value into its JSON wire shape, dispatching
//! on the validator variant. Values are re-validated on the way out:
//! composite values can be mutated after construction, so a stored
//! instance is not trusted to still satisfy its constraints.

use std::fmt::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Number, Value as Json};

use crate::schema::{ValidationError, Validator, Value};

use super::errors::CodecResult;

/// Serializes `value` as JSON text after validating it against
/// `validator`.
pub fn json_encode(validator: &Validator, value: &Value) -> CodecResult<String> {
    Ok(encode(validator, value)?.to_string())
}

/// Converts a validated native value into its JSON wire shape.
///
/// # Errors
///
/// Returns `CodecError` when the value fails the validator's constraints
/// or a required struct field has no value to emit.
pub fn encode(validator: &Validator, value: &Value) -> CodecResult<Json> {
    match validator {
        Validator::Boolean => match value {
            Value::Bool(b) => Ok(Json::Bool(*b)),
            other => Err(ValidationError::wrong_type("a boolean", other.type_name()).into()),
        },
        Validator::Integer(iv) => match value {
            Value::Int(n) => {
                iv.validate(value)?;
                Ok(Json::Number(integer_number(*n)))
            }
            other => Err(ValidationError::wrong_type("an integer", other.type_name()).into()),
        },
        Validator::Float(fv) => {
            fv.validate(value)?;
            let x = match value {
                Value::Float(x) => *x,
                Value::Int(n) => *n as f64,
                other => {
                    return Err(
                        ValidationError::wrong_type("a float", other.type_name()).into()
                    )
                }
            };
            float_number(x).map(Json::Number)
        }
        Validator::String(sv) => match value {
            Value::Str(s) => {
                sv.validate(value)?;
                Ok(Json::String(s.clone()))
            }
            other => Err(ValidationError::wrong_type("a string", other.type_name()).into()),
        },
        Validator::Binary(bv) => match value {
            Value::Bytes(bytes) => {
                bv.validate(value)?;
                Ok(Json::String(STANDARD.encode(bytes)))
            }
            other => {
                Err(ValidationError::wrong_type("a byte sequence", other.type_name()).into())
            }
        },
        Validator::Timestamp(tv) => match value {
            Value::Timestamp(dt) => {
                let mut out = String::new();
                write!(out, "{}", dt.format(tv.format())).map_err(|_| {
                    ValidationError::format_mismatch(format!(
                        "timestamp cannot be rendered with format '{}'",
                        tv.format()
                    ))
                })?;
                Ok(Json::String(out))
            }
            other => Err(ValidationError::wrong_type("a timestamp", other.type_name()).into()),
        },
        Validator::Any => encode_any(value),
        Validator::Symbol => Err(ValidationError::wrong_type(
            "a union context (symbols have no standalone wire form)",
            value.type_name(),
        )
        .into()),
        Validator::Null => match value {
            Value::Null => Ok(Json::Null),
            other => Err(ValidationError::wrong_type("null", other.type_name()).into()),
        },
        Validator::Nullable(inner) => match value {
            Value::Null => Ok(Json::Null),
            other => encode(inner, other),
        },
        Validator::List(lv) => {
            lv.validate(value)?;
            let items = match value {
                Value::List(items) => items,
                other => {
                    return Err(ValidationError::wrong_type("a list", other.type_name()).into())
                }
            };
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(encode(lv.item(), item).map_err(|e| e.at_index(i))?);
            }
            Ok(Json::Array(out))
        }
        Validator::Struct(ty) => {
            validator.validate(value)?;
            let sv = match value {
                Value::Struct(sv) => sv,
                other => {
                    return Err(ValidationError::wrong_type(
                        format!("struct '{}'", ty.name()),
                        other.type_name(),
                    )
                    .into())
                }
            };
            let mut obj = Map::new();
            for field in ty.all_fields() {
                let encoded = match sv.raw(&field.name) {
                    Some(v) => encode(&field.validator, v).map_err(|e| e.at(&field.name))?,
                    None if field.validator.is_nullable() => Json::Null,
                    None => match &field.default {
                        Some(default) => {
                            encode(&field.validator, default).map_err(|e| e.at(&field.name))?
                        }
                        None => return Err(ValidationError::missing_value(&field.name).into()),
                    },
                };
                obj.insert(field.name.clone(), encoded);
            }
            Ok(Json::Object(obj))
        }
        Validator::Union(ty) => {
            validator.validate(value)?;
            let uv = match value {
                Value::Union(uv) => uv,
                other => {
                    return Err(ValidationError::wrong_type(
                        format!("union '{}'", ty.name()),
                        other.type_name(),
                    )
                    .into())
                }
            };
            let variant = ty
                .variant(uv.tag())
                .ok_or_else(|| ValidationError::unknown_variant(uv.tag()))?;
            match &variant.validator {
                Validator::Symbol | Validator::Any => Ok(Json::String(uv.tag().to_string())),
                tag_validator => {
                    let payload = match uv.value() {
                        Some(v) => encode(tag_validator, v).map_err(|e| e.at(uv.tag()))?,
                        None if tag_validator.is_nullable() => Json::Null,
                        None => {
                            return Err(ValidationError::missing_value(uv.tag()).into());
                        }
                    };
                    let mut obj = Map::new();
                    obj.insert(uv.tag().to_string(), payload);
                    Ok(Json::Object(obj))
                }
            }
        }
    }
}

/// Values under an `any` validator pass through with their natural JSON
/// shape; composites have no validator to drive them and are rejected.
fn encode_any(value: &Value) -> CodecResult<Json> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Int(n) => Ok(Json::Number(integer_number(*n))),
        Value::Float(x) => float_number(*x).map(Json::Number),
        Value::Str(s) => Ok(Json::String(s.clone())),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(encode_any(item).map_err(|e| e.at_index(i))?);
            }
            Ok(Json::Array(out))
        }
        other => {
            Err(ValidationError::wrong_type("a JSON-native value", other.type_name()).into())
        }
    }
}

/// Integers always encode as JSON numbers. Everything up to unsigned
/// 64-bit fits one of serde_json's two integer shapes.
fn integer_number(n: i128) -> Number {
    if n < 0 {
        Number::from(n as i64)
    } else {
        Number::from(n as u64)
    }
}

fn float_number(x: f64) -> CodecResult<Number> {
    Number::from_f64(x).ok_or_else(|| {
        ValidationError::wrong_type("a finite float", "a non-finite float").into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, StructType, StructValue, UnionType, UnionValue, Variant};
    use serde_json::json;

    #[test]
    fn test_encode_primitives() {
        let string = Validator::string(None, None, None).unwrap();
        assert_eq!(
            encode(&string, &Value::Str("abc".into())).unwrap(),
            json!("abc")
        );
        assert_eq!(
            encode(&string, &Value::Str("\u{2650}".into())).unwrap(),
            json!("\u{2650}")
        );
        assert_eq!(
            encode(&Validator::uint32(None, None).unwrap(), &Value::Int(123)).unwrap(),
            json!(123)
        );
        assert_eq!(
            encode(&Validator::Boolean, &Value::Bool(true)).unwrap(),
            json!(true)
        );
        assert_eq!(
            encode(&Validator::float(None, None).unwrap(), &Value::Float(0.5)).unwrap(),
            json!(0.5)
        );
    }

    #[test]
    fn test_encode_boolean_where_integer_expected_fails() {
        // native booleans and integers never overlap; a bool can only
        // ever encode as true/false via a Boolean validator
        let err = encode(&Validator::uint32(None, None).unwrap(), &Value::Bool(true));
        assert!(err.is_err());
    }

    #[test]
    fn test_encode_integer_coerced_by_float_validator() {
        assert_eq!(
            encode(&Validator::float(None, None).unwrap(), &Value::Int(100)).unwrap(),
            json!(100.0)
        );
    }

    #[test]
    fn test_encode_binary_is_base64() {
        let bytes = vec![0xff; 5];
        assert_eq!(
            encode(&Validator::binary(None, None).unwrap(), &Value::Bytes(bytes)).unwrap(),
            json!("//////8=")
        );
    }

    #[test]
    fn test_encode_timestamp_uses_format() {
        let v = Validator::timestamp("%a, %d %b %Y %H:%M:%S +0000").unwrap();
        let dt = chrono::NaiveDate::from_ymd_opt(2015, 5, 12)
            .unwrap()
            .and_hms_opt(15, 50, 38)
            .unwrap();
        assert_eq!(
            encode(&v, &Value::Timestamp(dt)).unwrap(),
            json!("Tue, 12 May 2015 15:50:38 +0000")
        );
    }

    #[test]
    fn test_encode_nullable() {
        let v = Validator::nullable(Validator::string(None, None, None).unwrap()).unwrap();
        assert_eq!(encode(&v, &Value::Null).unwrap(), json!(null));
        assert_eq!(encode(&v, &Value::Str("abc".into())).unwrap(), json!("abc"));
    }

    #[test]
    fn test_encode_list_revalidates_items() {
        let v = Validator::list(Validator::int64(None, None).unwrap(), None, None).unwrap();
        let good = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(encode(&v, &good).unwrap(), json!([1, 2, 3]));

        let bad = Value::List(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Str("a".into()),
        ]);
        let err = encode(&v, &bad).unwrap_err();
        assert_eq!(err.as_validation().unwrap().path(), Some("[3]"));
    }

    fn shirt() -> std::sync::Arc<StructType> {
        StructType::new(
            "Shirt",
            None,
            vec![
                FieldSpec::new("label", Validator::string(None, None, None).unwrap()),
                FieldSpec::with_default(
                    "size",
                    Validator::string(None, None, None).unwrap(),
                    Value::Str("M".into()),
                ),
                FieldSpec::new(
                    "color",
                    Validator::nullable(Validator::string(None, None, None).unwrap()).unwrap(),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_struct_with_fallbacks() {
        let ty = shirt();
        let mut shirt = StructValue::new(ty.clone());
        shirt.set("label", Value::Str("crew".into())).unwrap();

        let encoded = encode(&Validator::Struct(ty), &Value::Struct(shirt)).unwrap();
        assert_eq!(
            encoded,
            json!({"label": "crew", "size": "M", "color": null})
        );
    }

    #[test]
    fn test_encode_struct_missing_required_field() {
        let ty = shirt();
        let shirt = StructValue::new(ty.clone());
        let err = encode(&Validator::Struct(ty), &Value::Struct(shirt)).unwrap_err();
        assert_eq!(err.as_validation().unwrap().path(), Some("label"));
    }

    fn sample_union() -> std::sync::Arc<UnionType> {
        let shirt = shirt();
        UnionType::new(
            "Sample",
            None,
            vec![
                Variant::new("a", Validator::int64(None, None).unwrap()),
                Variant::new("b", Validator::Symbol),
                Variant::new("c", Validator::Struct(shirt)),
                Variant::new(
                    "d",
                    Validator::list(Validator::int64(None, None).unwrap(), None, None).unwrap(),
                ),
                Variant::new(
                    "e",
                    Validator::nullable(Validator::int64(None, None).unwrap()).unwrap(),
                ),
            ],
            Some("b".into()),
        )
        .unwrap()
    }

    #[test]
    fn test_encode_union_primitive_variant() {
        let ty = sample_union();
        let u = UnionValue::new(ty.clone(), "a", Some(Value::Int(64))).unwrap();
        assert_eq!(
            encode(&Validator::Union(ty), &Value::Union(u)).unwrap(),
            json!({"a": 64})
        );
    }

    #[test]
    fn test_encode_union_symbol_variant_is_bare_string() {
        let ty = sample_union();
        let u = UnionValue::symbol(ty.clone(), "b").unwrap();
        assert_eq!(
            encode(&Validator::Union(ty), &Value::Union(u)).unwrap(),
            json!("b")
        );
    }

    #[test]
    fn test_encode_union_struct_variant() {
        let ty = sample_union();
        let mut inner = StructValue::new(shirt());
        inner.set("label", Value::Str("crew".into())).unwrap();
        let u = UnionValue::new(ty.clone(), "c", Some(Value::Struct(inner))).unwrap();
        assert_eq!(
            encode(&Validator::Union(ty), &Value::Union(u)).unwrap(),
            json!({"c": {"label": "crew", "size": "M", "color": null}})
        );
    }

    #[test]
    fn test_encode_union_nullable_variant() {
        let ty = sample_union();
        let u = UnionValue::new(ty.clone(), "e", None).unwrap();
        assert_eq!(
            encode(&Validator::Union(ty.clone()), &Value::Union(u)).unwrap(),
            json!({"e": null})
        );
        let u = UnionValue::new(ty.clone(), "e", Some(Value::Int(64))).unwrap();
        assert_eq!(
            encode(&Validator::Union(ty), &Value::Union(u)).unwrap(),
            json!({"e": 64})
        );
    }

    #[test]
    fn test_encode_nullable_union() {
        let ty = sample_union();
        let v = Validator::nullable(Validator::Union(ty.clone())).unwrap();
        assert_eq!(encode(&v, &Value::Null).unwrap(), json!(null));

        let u = UnionValue::new(ty, "d", Some(Value::List(vec![Value::Int(1)]))).unwrap();
        assert_eq!(encode(&v, &Value::Union(u)).unwrap(), json!({"d": [1]}));
    }

    #[test]
    fn test_encode_any_passthrough() {
        assert_eq!(
            encode(&Validator::Any, &Value::List(vec![Value::Int(1), Value::Bool(true)]))
                .unwrap(),
            json!([1, true])
        );
        assert!(encode(&Validator::Any, &Value::Bytes(vec![1])).is_err());
    }

    #[test]
    fn test_json_encode_produces_text() {
        let v = Validator::string(None, None, None).unwrap();
        assert_eq!(
            json_encode(&v, &Value::Str("abc".into())).unwrap(),
            "\"abc\""
        );
    }
}
