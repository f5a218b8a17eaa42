//! JSON wire format
//!
//! Stateless encode/decode over validators. The wire shape of every
//! schema construct:
//!
//! - string/float/boolean: native JSON string/number/boolean
//! - integer: JSON number, never boolean-shaped
//! - binary: base64 string
//! - timestamp: string in the validator's configured format
//! - nullable absent: `null`
//! - list: JSON array, element order preserved
//! - struct: JSON object, inherited fields flattened to the same level
//! - union, symbol/any tag: bare JSON string equal to the tag
//! - union, other tag: single-key JSON object `{tag: value}`
//!
//! Decode takes a `strict` flag; see [`decode`].

mod decode;
mod encode;
mod errors;

pub use decode::{decode, json_decode};
pub use encode::{encode, json_encode};
pub use errors::{CodecError, CodecResult, WireFormatError};
