//! Schema type descriptors
//!
//! These are the finalized products of the grammar-level parser: struct
//! and union shapes, plus route metadata. Each descriptor precomputes its
//! effective (inheritance-merged) member table once at construction, as
//! plain immutable data, so validation and codec dispatch never walk the
//! hierarchy at runtime. Descriptors are shared read-only via `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{SchemaDefinitionError, SchemaResult};
use super::validator::Validator;
use super::value::Value;

/// A single named, validated slot in a struct.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub validator: Validator,
    /// Value used when the field is never set; fields with a default are
    /// not required on decode.
    pub default: Option<Value>,
}

impl FieldSpec {
    /// Create a required field.
    pub fn new(name: impl Into<String>, validator: Validator) -> Self {
        Self {
            name: name.into(),
            validator,
            default: None,
        }
    }

    /// Create a field with a declared default value.
    pub fn with_default(name: impl Into<String>, validator: Validator, default: Value) -> Self {
        Self {
            name: name.into(),
            validator,
            default: Some(default),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// A struct shape: named fields, optionally extending a supertype.
///
/// The effective field list is the supertype's effective fields, in
/// order, followed by this struct's own fields. Field names must be
/// unique across the merged list.
#[derive(Debug)]
pub struct StructType {
    name: String,
    supertype: Option<Arc<StructType>>,
    fields: Vec<FieldSpec>,
    all_fields: Vec<FieldSpec>,
}

impl StructType {
    /// Build a struct descriptor, merging the supertype's field table.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if a field name collides with any
    /// field in the effective list.
    pub fn new(
        name: impl Into<String>,
        supertype: Option<Arc<StructType>>,
        fields: Vec<FieldSpec>,
    ) -> SchemaResult<Arc<Self>> {
        let name = name.into();
        let mut all_fields: Vec<FieldSpec> = supertype
            .as_ref()
            .map(|s| s.all_fields.clone())
            .unwrap_or_default();
        for field in &fields {
            if all_fields.iter().any(|f| f.name == field.name) {
                return Err(SchemaDefinitionError::DuplicateField {
                    name,
                    field: field.name.clone(),
                });
            }
            all_fields.push(field.clone());
        }
        Ok(Arc::new(Self {
            name,
            supertype,
            fields,
            all_fields,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertype(&self) -> Option<&Arc<StructType>> {
        self.supertype.as_ref()
    }

    /// Fields declared on this struct only.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Effective field list: inherited fields first, declaration order.
    pub fn all_fields(&self) -> &[FieldSpec] {
        &self.all_fields
    }

    /// Look up a field by name in the effective list.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.all_fields.iter().find(|f| f.name == name)
    }

    /// Whether this type is `expected` or inherits from it.
    pub fn conforms_to(self: &Arc<Self>, expected: &Arc<StructType>) -> bool {
        let mut current = Some(self.clone());
        while let Some(ty) = current {
            if Arc::ptr_eq(&ty, expected) {
                return true;
            }
            current = ty.supertype.clone();
        }
        false
    }
}

/// One tagged alternative of a union.
#[derive(Debug, Clone)]
pub struct Variant {
    pub tag: String,
    pub validator: Validator,
}

impl Variant {
    pub fn new(tag: impl Into<String>, validator: Validator) -> Self {
        Self {
            tag: tag.into(),
            validator,
        }
    }
}

/// A tagged union shape, optionally extending a parent union.
///
/// The effective variant list is the parent's variants merged with this
/// union's own, own tags winning on conflict, declaration order
/// preserved. The catch-all tag, if set, must name an effective variant
/// that carries no payload (Symbol or Any), since lenient decode
/// materializes it with none.
#[derive(Debug)]
pub struct UnionType {
    name: String,
    parent: Option<Arc<UnionType>>,
    variants: Vec<Variant>,
    all_variants: Vec<Variant>,
    catch_all: Option<String>,
}

impl UnionType {
    /// Build a union descriptor, merging the parent's variant table.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` on duplicate own tags, a catch-all
    /// tag that names no effective variant, or a catch-all variant that
    /// requires a payload.
    pub fn new(
        name: impl Into<String>,
        parent: Option<Arc<UnionType>>,
        variants: Vec<Variant>,
        catch_all: Option<String>,
    ) -> SchemaResult<Arc<Self>> {
        let name = name.into();
        for (i, variant) in variants.iter().enumerate() {
            if variants[..i].iter().any(|v| v.tag == variant.tag) {
                return Err(SchemaDefinitionError::DuplicateVariant {
                    name,
                    tag: variant.tag.clone(),
                });
            }
        }

        let mut all_variants: Vec<Variant> = parent
            .as_ref()
            .map(|p| p.all_variants.clone())
            .unwrap_or_default();
        for variant in &variants {
            match all_variants.iter_mut().find(|v| v.tag == variant.tag) {
                Some(slot) => *slot = variant.clone(),
                None => all_variants.push(variant.clone()),
            }
        }

        if let Some(tag) = &catch_all {
            match all_variants.iter().find(|v| &v.tag == tag) {
                None => {
                    return Err(SchemaDefinitionError::UnknownCatchAllTag {
                        name,
                        tag: tag.clone(),
                    });
                }
                Some(variant)
                    if !matches!(variant.validator, Validator::Symbol | Validator::Any) =>
                {
                    return Err(SchemaDefinitionError::InvalidCatchAllTag {
                        name,
                        tag: tag.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Arc::new(Self {
            name,
            parent,
            variants,
            all_variants,
            catch_all,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<UnionType>> {
        self.parent.as_ref()
    }

    /// Variants declared on this union only.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Effective variant list, declaration order, own tags winning.
    pub fn all_variants(&self) -> &[Variant] {
        &self.all_variants
    }

    /// Look up a variant by tag in the effective list.
    pub fn variant(&self, tag: &str) -> Option<&Variant> {
        self.all_variants.iter().find(|v| v.tag == tag)
    }

    pub fn catch_all(&self) -> Option<&str> {
        self.catch_all.as_deref()
    }

    /// Whether this type is `expected` or inherits from it.
    pub fn conforms_to(self: &Arc<Self>, expected: &Arc<UnionType>) -> bool {
        let mut current = Some(self.clone());
        while let Some(ty) = current {
            if Arc::ptr_eq(&ty, expected) {
                return true;
            }
            current = ty.parent.clone();
        }
        false
    }
}

/// Route metadata produced by the parser and carried through to code
/// generators unchanged. The runtime never interprets `attrs`.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub name: String,
    pub request: Validator,
    pub response: Validator,
    pub error: Validator,
    pub attrs: HashMap<String, Value>,
    pub deprecated: bool,
}

impl RouteSpec {
    pub fn new(
        name: impl Into<String>,
        request: Validator,
        response: Validator,
        error: Validator,
    ) -> Self {
        Self {
            name: name.into(),
            request,
            response,
            error,
            attrs: HashMap::new(),
            deprecated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Arc<StructType> {
        StructType::new(
            "Person",
            None,
            vec![FieldSpec::new(
                "name",
                Validator::string(None, None, None).unwrap(),
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_struct_field_merging() {
        let person = person();
        let employee = StructType::new(
            "Employee",
            Some(person.clone()),
            vec![FieldSpec::new("badge", Validator::uint64(None, None).unwrap())],
        )
        .unwrap();

        let names: Vec<_> = employee.all_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "badge"]);
        assert_eq!(employee.fields().len(), 1);
        assert!(employee.field("name").is_some());
    }

    #[test]
    fn test_struct_duplicate_field_rejected() {
        let person = person();
        let result = StructType::new(
            "Employee",
            Some(person),
            vec![FieldSpec::new(
                "name",
                Validator::string(None, None, None).unwrap(),
            )],
        );
        assert!(matches!(
            result,
            Err(SchemaDefinitionError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_struct_conformance() {
        let person = person();
        let employee = StructType::new("Employee", Some(person.clone()), vec![]).unwrap();
        let other = StructType::new("Account", None, vec![]).unwrap();

        assert!(employee.conforms_to(&person));
        assert!(employee.conforms_to(&employee));
        assert!(!person.conforms_to(&employee));
        assert!(!other.conforms_to(&person));
    }

    #[test]
    fn test_union_variant_merging() {
        let base = UnionType::new(
            "BaseError",
            None,
            vec![Variant::new("other", Validator::Symbol)],
            Some("other".into()),
        )
        .unwrap();
        let child = UnionType::new(
            "LookupError",
            Some(base),
            vec![Variant::new("not_found", Validator::Symbol)],
            None,
        )
        .unwrap();

        let tags: Vec<_> = child.all_variants().iter().map(|v| v.tag.as_str()).collect();
        assert_eq!(tags, vec!["other", "not_found"]);
        assert!(child.variant("other").is_some());
    }

    #[test]
    fn test_union_own_tag_wins_on_conflict() {
        let base = UnionType::new(
            "Base",
            None,
            vec![Variant::new("a", Validator::Symbol)],
            None,
        )
        .unwrap();
        let child = UnionType::new(
            "Child",
            Some(base),
            vec![Variant::new("a", Validator::int64(None, None).unwrap())],
            None,
        )
        .unwrap();

        assert_eq!(child.all_variants().len(), 1);
        assert!(matches!(
            child.variant("a").unwrap().validator,
            Validator::Integer(_)
        ));
    }

    #[test]
    fn test_union_duplicate_own_tag_rejected() {
        let result = UnionType::new(
            "Broken",
            None,
            vec![
                Variant::new("a", Validator::Symbol),
                Variant::new("a", Validator::Symbol),
            ],
            None,
        );
        assert!(matches!(
            result,
            Err(SchemaDefinitionError::DuplicateVariant { .. })
        ));
    }

    #[test]
    fn test_catch_all_must_exist() {
        let result = UnionType::new(
            "U",
            None,
            vec![Variant::new("a", Validator::Symbol)],
            Some("missing".into()),
        );
        assert!(matches!(
            result,
            Err(SchemaDefinitionError::UnknownCatchAllTag { .. })
        ));
    }

    #[test]
    fn test_catch_all_must_be_payload_free() {
        let result = UnionType::new(
            "U",
            None,
            vec![Variant::new("a", Validator::int64(None, None).unwrap())],
            Some("a".into()),
        );
        assert!(matches!(
            result,
            Err(SchemaDefinitionError::InvalidCatchAllTag { .. })
        ));
    }

    #[test]
    fn test_catch_all_resolves_through_parent() {
        let base = UnionType::new(
            "Base",
            None,
            vec![Variant::new("other", Validator::Symbol)],
            None,
        )
        .unwrap();
        let child = UnionType::new("Child", Some(base), vec![], Some("other".into())).unwrap();
        assert_eq!(child.catch_all(), Some("other"));
    }
}
