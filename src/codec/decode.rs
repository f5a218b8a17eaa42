//! JSON decoding
//!
//! `decode` converts a JSON wire value back into a native value,
//! dispatching on the validator variant. Decode takes a `strict` flag:
//! strict rejects unknown struct fields and unknown union tags outright;
//! lenient drops unknown fields and falls back to a union's catch-all
//! tag for unknown object-form tags. An unknown bare-string tag always
//! fails, strict or not.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value as Json;

use crate::schema::{
    StructType, StructValue, UnionType, UnionValue, ValidationError, ValidationKind, Validator,
    Value,
};
use std::sync::Arc;

use super::errors::{CodecResult, WireFormatError};

/// Parses `input` as JSON and decodes it against `validator`.
///
/// # Errors
///
/// Returns `WireFormatError` when the text is not JSON, otherwise as
/// `decode`.
pub fn json_decode(validator: &Validator, input: &str, strict: bool) -> CodecResult<Value> {
    let json: Json =
        serde_json::from_str(input).map_err(|e| WireFormatError::MalformedJson(e.to_string()))?;
    decode(validator, &json, strict)
}

/// Converts a JSON wire value into a validated native value.
///
/// # Errors
///
/// Returns `CodecError` when the JSON is not the shape the validator
/// calls for, or a decoded value violates a constraint.
pub fn decode(validator: &Validator, json: &Json, strict: bool) -> CodecResult<Value> {
    match validator {
        Validator::Boolean => match json {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(ValidationError::wrong_type("a boolean", json_type_name(other)).into()),
        },
        Validator::Integer(iv) => {
            let n = json
                .as_i64()
                .map(i128::from)
                .or_else(|| json.as_u64().map(i128::from))
                .ok_or_else(|| {
                    ValidationError::wrong_type("an integer", json_type_name(json))
                })?;
            let value = Value::Int(n);
            iv.validate(&value)?;
            Ok(value)
        }
        Validator::Float(fv) => {
            let x = json
                .as_f64()
                .ok_or_else(|| ValidationError::wrong_type("a float", json_type_name(json)))?;
            let value = Value::Float(x);
            fv.validate(&value)?;
            Ok(value)
        }
        Validator::String(sv) => match json {
            Json::String(s) => {
                let value = Value::Str(s.clone());
                sv.validate(&value)?;
                Ok(value)
            }
            other => Err(ValidationError::wrong_type("a string", json_type_name(other)).into()),
        },
        Validator::Binary(bv) => match json {
            Json::String(s) => {
                let bytes = STANDARD.decode(s).map_err(|e| {
                    ValidationError::format_mismatch(format!("invalid base64: {}", e))
                })?;
                let value = Value::Bytes(bytes);
                bv.validate(&value)?;
                Ok(value)
            }
            other => {
                Err(ValidationError::wrong_type("a base64 string", json_type_name(other)).into())
            }
        },
        Validator::Timestamp(tv) => match json {
            Json::String(s) => {
                let dt = chrono::NaiveDateTime::parse_from_str(s, tv.format()).map_err(|e| {
                    ValidationError::format_mismatch(format!(
                        "'{}' does not match format '{}': {}",
                        s,
                        tv.format(),
                        e
                    ))
                })?;
                Ok(Value::Timestamp(dt))
            }
            other => {
                Err(ValidationError::wrong_type("a timestamp string", json_type_name(other))
                    .into())
            }
        },
        Validator::Any => decode_any(json),
        Validator::Symbol => Err(ValidationError::new(
            ValidationKind::WrongType,
            "symbol variants have no standalone wire form",
        )
        .into()),
        Validator::Null => match json {
            Json::Null => Ok(Value::Null),
            other => Err(ValidationError::wrong_type("null", json_type_name(other)).into()),
        },
        Validator::Nullable(inner) => match json {
            Json::Null => Ok(Value::Null),
            other => decode(inner, other, strict),
        },
        Validator::List(lv) => match json {
            Json::Array(items) => {
                lv.check_count(items.len())?;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(decode(lv.item(), item, strict).map_err(|e| e.at_index(i))?);
                }
                Ok(Value::List(out))
            }
            other => Err(ValidationError::wrong_type("a list", json_type_name(other)).into()),
        },
        Validator::Struct(ty) => decode_struct(ty, json, strict),
        Validator::Union(ty) => decode_union(ty, json, strict),
    }
}

fn decode_struct(ty: &Arc<StructType>, json: &Json, strict: bool) -> CodecResult<Value> {
    let obj = json.as_object().ok_or_else(|| {
        ValidationError::wrong_type(format!("struct '{}'", ty.name()), json_type_name(json))
    })?;

    let mut value = StructValue::new(ty.clone());
    for (key, item) in obj {
        let Some(field) = ty.field(key) else {
            if strict {
                return Err(ValidationError::unknown_field(key).into());
            }
            continue;
        };
        let decoded = decode(&field.validator, item, strict).map_err(|e| e.at(key))?;
        if decoded == Value::Null {
            // a nullable field sent as null stays absent
            continue;
        }
        value.set(key, decoded)?;
    }

    for field in ty.all_fields() {
        if !value.is_set(&field.name) && !field.validator.is_nullable() && !field.has_default() {
            return Err(ValidationError::missing_field(&field.name).into());
        }
    }

    Ok(Value::Struct(value))
}

fn decode_union(ty: &Arc<UnionType>, json: &Json, strict: bool) -> CodecResult<Value> {
    match json {
        // Bare tag form. Unknown tags always fail here: the catch-all
        // fallback applies only to the object form.
        Json::String(tag) => {
            let variant = ty
                .variant(tag)
                .ok_or_else(|| ValidationError::unknown_variant(tag))?;
            if !matches!(variant.validator, Validator::Symbol | Validator::Any) {
                return Err(ValidationError::new(
                    ValidationKind::WrongType,
                    format!("variant '{}' carries a value and cannot decode from a bare tag", tag),
                )
                .into());
            }
            Ok(Value::Union(UnionValue::symbol(ty.clone(), tag)?))
        }
        Json::Object(obj) => {
            if obj.len() != 1 {
                return Err(WireFormatError::MultiKeyUnion(obj.len()).into());
            }
            let (tag, payload) = obj.iter().next().unwrap(); // length checked above

            match ty.variant(tag) {
                Some(variant) => {
                    let value = match &variant.validator {
                        Validator::Symbol | Validator::Any => {
                            if !payload.is_null() {
                                return Err(ValidationError::new(
                                    ValidationKind::WrongType,
                                    format!("variant '{}' does not carry a value", tag),
                                )
                                .into());
                            }
                            None
                        }
                        tag_validator => {
                            match decode(tag_validator, payload, strict)
                                .map_err(|e| e.at(tag))?
                            {
                                Value::Null => None,
                                decoded => Some(decoded),
                            }
                        }
                    };
                    Ok(Value::Union(UnionValue::new(ty.clone(), tag, value)?))
                }
                None if !strict => match ty.catch_all() {
                    Some(catch_all) => {
                        Ok(Value::Union(UnionValue::symbol(ty.clone(), catch_all)?))
                    }
                    None => Err(ValidationError::unknown_variant(tag).into()),
                },
                None => Err(ValidationError::unknown_variant(tag).into()),
            }
        }
        other => Err(WireFormatError::BadUnionShape(json_type_name(other).to_string()).into()),
    }
}

/// JSON under an `any` validator maps to its natural native value.
/// Objects have no native mapping without a validator and are rejected.
fn decode_any(json: &Json) -> CodecResult<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i128::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Int(i128::from(u)))
            } else {
                // serde_json numbers are always representable as f64
                Ok(Value::Float(n.as_f64().unwrap_or_default()))
            }
        }
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(decode_any(item).map_err(|e| e.at_index(i))?);
            }
            Ok(Value::List(out))
        }
        Json::Object(_) => Err(WireFormatError::UnsupportedAny("object").into()),
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "float"
            }
        }
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
