use std::sync::Arc;

use serde_json::{json, Map, Value};

/// Declared type of a record field. Interpreter results are coerced into the
/// declared kind on assignment; `Record` fields compose a nested schema and
/// are descended into during evaluation.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// No declared type; accepts any value and is never recursed into.
    Any,
    Bool,
    Integer,
    Float,
    String,
    Array,
    /// Free-form object without field metadata of its own.
    Object,
    /// Nested record with its own annotated fields.
    Record(Arc<RecordSchema>),
}

impl FieldKind {
    /// Zero value assigned when an interpreter yields null.
    pub fn zero(&self) -> Value {
        match self {
            FieldKind::Any => Value::Null,
            FieldKind::Bool => json!(false),
            FieldKind::Integer => json!(0),
            FieldKind::Float => json!(0.0),
            FieldKind::String => json!(""),
            FieldKind::Array => json!([]),
            FieldKind::Object => json!({}),
            FieldKind::Record(schema) => schema.zero_value(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FieldKind::Any => "any",
            FieldKind::Bool => "bool",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
            FieldKind::Record(_) => "record",
        }
    }
}

/// One field of a record type: declaration name, declared kind, the raw
/// metadata annotation shared by all instances of the owning type, and
/// whether the engine may write evaluation results back into it.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub annotation: String,
    pub writable: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation: String::new(),
            writable: true,
        }
    }

    /// Attaches the raw annotation string scanned for expressions.
    pub fn annotation(mut self, raw: impl Into<String>) -> Self {
        self.annotation = raw.into();
        self
    }

    /// Marks the field as not assignable; it is still evaluated and recursed
    /// into, but results are never written back.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

/// Type-level description of a record: a name (used for error attribution as
/// the `OwnerType` part of `<<OwnerType.FieldName>>`) and an ordered field
/// list. Field metadata lives here, attached to the type, never to instances.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// A fresh instance of this record type with every field zeroed,
    /// including nested records.
    pub fn zero_value(&self) -> Value {
        let mut map = Map::new();
        for f in &self.fields {
            map.insert(f.name.clone(), f.kind.zero());
        }
        Value::Object(map)
    }
}
