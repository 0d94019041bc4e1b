//! Schema types and decoding
//!
//! A PDSC file is decoded once into a [`SchemaRecord`]. Every field type is
//! turned into a [`TypeDescriptor`], a closed sum type the resolver can match
//! exhaustively. Shapes that fit none of the variants are rejected here, so a
//! decoded record is always fully resolvable.

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::resolve::{is_primitive, qualify, NAMESPACE_SEPARATOR};

/// Container kinds that wrap a single payload descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    /// `{"type": "map", "values": ...}`
    Map,
    /// `{"type": "array", "items": ...}`
    Array,
    /// `{"type": "typeref", "ref": ...}`
    Typeref,
}

impl WrapperKind {
    /// Member holding the wrapped descriptor
    pub fn payload_key(&self) -> &'static str {
        match self {
            Self::Map => "values",
            Self::Array => "items",
            Self::Typeref => "ref",
        }
    }

    /// Whether references reached through this wrapper are collections
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Map | Self::Array)
    }
}

/// Decoded shape of a field type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// No type given
    Absent,
    /// Bare type name, primitive or named
    Name(String),
    /// Map, array or typeref around another descriptor
    Wrapper {
        kind: WrapperKind,
        payload: Box<TypeDescriptor>,
    },
    /// Inline nested record
    Record {
        includes: Vec<TypeDescriptor>,
        fields: Vec<Field>,
    },
    /// Union-like list of descriptors
    Union(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Decode a raw JSON descriptor
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Absent),
            Value::String(name) => Ok(Self::Name(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_value)
                .collect::<Result<Vec<_>>>()
                .map(Self::Union),
            Value::Object(obj) => match obj.get("type") {
                Some(Value::String(kind)) => match kind.as_str() {
                    "map" => Self::wrapper(WrapperKind::Map, value),
                    "array" => Self::wrapper(WrapperKind::Array, value),
                    "typeref" => Self::wrapper(WrapperKind::Typeref, value),
                    "record" => Ok(Self::Record {
                        includes: decode_includes(value)?,
                        fields: decode_fields(obj.get("fields"))?,
                    }),
                    // inline enum/fixed declarations and wrapped primitives
                    primitive if is_primitive(primitive) => Ok(Self::Name(primitive.to_string())),
                    _ => Err(SchemaError::unsupported(value)),
                },
                Some(nested @ (Value::Object(_) | Value::Array(_))) => Self::from_value(nested),
                _ => Err(SchemaError::unsupported(value)),
            },
            Value::Bool(_) | Value::Number(_) => Err(SchemaError::unsupported(value)),
        }
    }

    fn wrapper(kind: WrapperKind, value: &Value) -> Result<Self> {
        let payload = match value.get(kind.payload_key()) {
            Some(inner) => Self::from_value(inner)?,
            None => Self::Absent,
        };
        Ok(Self::Wrapper {
            kind,
            payload: Box::new(payload),
        })
    }
}

/// One named member of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Decode a `{"name": ..., "type": ...}` field object
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(SchemaError::unsupported(value));
        };
        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let ty = match obj.get("type") {
            Some(ty) => TypeDescriptor::from_value(ty)?,
            None => TypeDescriptor::Absent,
        };
        Ok(Self { name, ty })
    }
}

fn decode_fields(value: Option<&Value>) -> Result<Vec<Field>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(fields)) => fields.iter().map(Field::from_value).collect(),
        Some(other) => Err(SchemaError::unsupported(other)),
    }
}

fn decode_list(value: Option<&Value>) -> Result<Vec<TypeDescriptor>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(TypeDescriptor::from_value).collect(),
        Some(single) => Ok(vec![TypeDescriptor::from_value(single)?]),
    }
}

/// `include` or, failing that, `includes`
fn decode_includes(json: &Value) -> Result<Vec<TypeDescriptor>> {
    decode_list(json.get("include").or_else(|| json.get("includes")))
}

/// One parsed schema file
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRecord {
    pub name: String,
    pub namespace: String,
    pub fields: Vec<Field>,
    /// Alias target of a top-level typeref
    pub ref_target: Option<TypeDescriptor>,
    /// Mixed-in records
    pub includes: Vec<TypeDescriptor>,
}

impl SchemaRecord {
    /// Create an empty record
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            fields: Vec::new(),
            ref_target: None,
            includes: Vec::new(),
        }
    }

    /// Add a field (builder style)
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    /// Decode from comment-free JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Decode from an already parsed JSON document
    pub fn from_value(json: &Value) -> Result<Self> {
        if !json.is_object() {
            return Err(SchemaError::unsupported(json));
        }

        let name = json
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or(SchemaError::MissingField { field: "name" })?
            .to_string();

        let namespace = json
            .get("namespace")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let ref_target = match json.get("ref") {
            None | Some(Value::Null) => None,
            Some(target) => Some(TypeDescriptor::from_value(target)?),
        };

        let includes = decode_includes(json)?;
        let fields = decode_fields(json.get("fields"))?;

        Ok(Self {
            name,
            namespace,
            fields,
            ref_target,
            includes,
        })
    }

    /// Fully-qualified name of this record
    pub fn full_name(&self) -> String {
        qualify(&self.name, &self.namespace)
    }

    /// Whether the name already carries its namespace
    pub fn is_qualified(&self) -> bool {
        self.name.contains(NAMESPACE_SEPARATOR)
    }

    /// Namespace used to qualify bare names inside this record
    ///
    /// A qualified record name takes precedence over `namespace`.
    pub fn effective_namespace(&self) -> &str {
        match self.name.rsplit_once(NAMESPACE_SEPARATOR) {
            Some((namespace, _)) => namespace,
            None => &self.namespace,
        }
    }
}
