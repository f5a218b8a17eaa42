//! Schema type model, native values, and validators
//!
//! This is the enforcement half of the toolchain: the parser's finalized
//! type model becomes a tree of validators, one per field or type, and
//! every value flowing through the runtime is checked against them.
//!
//! # Design Principles
//!
//! - Validators are built once and immutable afterward
//! - Composite descriptors precompute their inheritance-merged tables
//! - Values are validated as fields are assigned, not after the fact
//! - Malformed schemas fail at construction, malformed values at use

mod errors;
mod types;
mod validator;
mod value;

pub use errors::{
    SchemaDefinitionError, SchemaResult, ValidationError, ValidationKind, ValidationResult,
};
pub use types::{FieldSpec, RouteSpec, StructType, UnionType, Variant};
pub use validator::{
    BinaryValidator, FloatValidator, IntegerValidator, IntegerWidth, ListValidator,
    StringValidator, TimestampValidator, Validator,
};
pub use value::{StructValue, UnionValue, Value};
