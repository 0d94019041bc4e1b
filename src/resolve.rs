//! Type Reference Resolution
//!
//! Flattens a decoded [`TypeDescriptor`] tree into the named types it refers
//! to. Primitive kinds never appear in the output, and a reference reached
//! through any map or array wrapper is marked as a collection reference.

use crate::schema::{SchemaRecord, TypeDescriptor};

/// Separator between namespace segments
pub const NAMESPACE_SEPARATOR: char = '.';

/// Built-in kinds that never become graph nodes
pub const PRIMITIVES: [&str; 10] = [
    "int", "long", "float", "double", "bytes", "string", "null", "boolean", "fixed", "enum",
];

/// A resolved reference to a named type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Fully-qualified target name
    pub name: String,
    /// Reached through a map or array
    pub is_collection: bool,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, is_collection: bool) -> Self {
        Self {
            name: name.into(),
            is_collection,
        }
    }
}

/// Whether `name` is a built-in kind
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Prefix `name` with `namespace` unless it is already qualified
pub fn qualify(name: &str, namespace: &str) -> String {
    if name.contains(NAMESPACE_SEPARATOR) || namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}{NAMESPACE_SEPARATOR}{name}")
    }
}

/// All references made by a record, in declaration order
///
/// The record's own `ref` comes first, then its includes, then each field.
pub fn type_refs(record: &SchemaRecord) -> Vec<TypeRef> {
    let mut refs = Vec::new();
    let namespace = record.effective_namespace();

    if let Some(target) = &record.ref_target {
        collect(target, namespace, false, &mut refs);
    }
    for include in &record.includes {
        collect(include, namespace, false, &mut refs);
    }
    for field in &record.fields {
        collect(&field.ty, namespace, false, &mut refs);
    }
    refs
}

/// Resolve one descriptor relative to `namespace`
pub fn resolve(descriptor: &TypeDescriptor, namespace: &str, is_collection: bool) -> Vec<TypeRef> {
    let mut refs = Vec::new();
    collect(descriptor, namespace, is_collection, &mut refs);
    refs
}

fn collect(descriptor: &TypeDescriptor, namespace: &str, is_collection: bool, refs: &mut Vec<TypeRef>) {
    match descriptor {
        TypeDescriptor::Absent => {}
        TypeDescriptor::Name(name) => {
            if !is_primitive(name) {
                refs.push(TypeRef::new(qualify(name, namespace), is_collection));
            }
        }
        TypeDescriptor::Wrapper { kind, payload } => {
            collect(payload, namespace, is_collection || kind.is_collection(), refs);
        }
        TypeDescriptor::Record { includes, fields } => {
            for include in includes {
                collect(include, namespace, is_collection, refs);
            }
            for field in fields {
                collect(&field.ty, namespace, is_collection, refs);
            }
        }
        TypeDescriptor::Union(members) => {
            for member in members {
                collect(member, namespace, is_collection, refs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::WrapperKind;
    use serde_json::json;

    fn descriptor(value: serde_json::Value) -> TypeDescriptor {
        TypeDescriptor::from_value(&value).unwrap()
    }

    #[test]
    fn test_primitives_are_skipped() {
        for name in PRIMITIVES {
            assert!(resolve(&TypeDescriptor::Name(name.to_string()), "ns", false).is_empty());
        }
    }

    #[test]
    fn test_bare_name_is_qualified() {
        let refs = resolve(&descriptor(json!("Bar")), "com.example", false);
        assert_eq!(refs, vec![TypeRef::new("com.example.Bar", false)]);
    }

    #[test]
    fn test_qualify_is_idempotent() {
        let once = qualify("Bar", "com.example");
        assert_eq!(qualify(&once, "com.example"), once);
        assert_eq!(qualify("com.other.Bar", "com.example"), "com.other.Bar");
        assert_eq!(qualify("Bar", ""), "Bar");
    }

    #[test]
    fn test_nested_collections_yield_one_reference() {
        let refs = resolve(
            &descriptor(json!({
                "type": "array",
                "items": { "type": "map", "values": "NS.T" }
            })),
            "NS",
            false,
        );
        assert_eq!(refs, vec![TypeRef::new("NS.T", true)]);
    }

    #[test]
    fn test_inline_record_keeps_flag() {
        let inline = json!({
            "type": "record",
            "name": "Inner",
            "fields": [{ "name": "x", "type": "NS.X" }]
        });
        assert_eq!(resolve(&descriptor(inline.clone()), "NS", false), vec![TypeRef::new("NS.X", false)]);

        let wrapped = json!({ "type": "array", "items": inline });
        assert_eq!(resolve(&descriptor(wrapped), "NS", false), vec![TypeRef::new("NS.X", true)]);
    }

    #[test]
    fn test_inline_record_includes_before_fields() {
        let inline = json!({
            "type": "record",
            "name": "Inner",
            "includes": ["NS.Base"],
            "fields": [{ "name": "x", "type": "X" }]
        });
        assert_eq!(
            resolve(&descriptor(json!({ "type": "map", "values": inline })), "NS", false),
            vec![TypeRef::new("NS.Base", true), TypeRef::new("NS.X", true)]
        );
    }

    #[test]
    fn test_typeref_keeps_flag() {
        let ty = TypeDescriptor::Wrapper {
            kind: WrapperKind::Typeref,
            payload: Box::new(TypeDescriptor::Name("Key".to_string())),
        };
        assert_eq!(resolve(&ty, "NS", false), vec![TypeRef::new("NS.Key", false)]);
        assert_eq!(resolve(&ty, "NS", true), vec![TypeRef::new("NS.Key", true)]);
    }

    #[test]
    fn test_union_preserves_order() {
        let refs = resolve(&descriptor(json!(["null", "B", "A", { "type": "map", "values": "C" }])), "NS", false);
        assert_eq!(
            refs,
            vec![
                TypeRef::new("NS.B", false),
                TypeRef::new("NS.A", false),
                TypeRef::new("NS.C", true),
            ]
        );
    }

    #[test]
    fn test_absent_is_empty() {
        assert!(resolve(&TypeDescriptor::Absent, "NS", true).is_empty());
        assert!(resolve(&descriptor(json!({ "type": "map" })), "NS", false).is_empty());
    }

    #[test]
    fn test_record_order_ref_includes_fields() {
        let record = SchemaRecord::from_value(&json!({
            "name": "A",
            "namespace": "NS",
            "ref": "R",
            "include": ["I"],
            "fields": [
                { "name": "f1", "type": "F1" },
                { "name": "f2", "type": "int" },
                { "name": "f3", "type": { "type": "array", "items": "F3" } }
            ]
        }))
        .unwrap();

        let names: Vec<_> = type_refs(&record).into_iter().map(|r| (r.name, r.is_collection)).collect();
        assert_eq!(
            names,
            vec![
                ("NS.R".to_string(), false),
                ("NS.I".to_string(), false),
                ("NS.F1".to_string(), false),
                ("NS.F3".to_string(), true),
            ]
        );
    }
}
