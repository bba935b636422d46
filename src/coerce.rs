use serde_json::Value;

use crate::schema::FieldKind;

/// Outcome of coercing an interpreter result into a field's declared kind.
#[derive(Debug)]
pub(crate) enum Coerced {
    /// Converted value, ready to assign.
    Assign(Value),
    /// Inconvertible result on a record-typed field: not an error, the
    /// result only seeds nested-record evaluation through the Sub channel.
    Skip,
}

/// Single boundary for "attempt conversion, may fail" logic. Always returns
/// a result-or-error; a failure never escapes the per-field boundary.
pub(crate) fn coerce(kind: &FieldKind, result: Value) -> Result<Coerced, String> {
    // Null means "no value": the field gets its declared zero value.
    if result.is_null() {
        return Ok(Coerced::Assign(kind.zero()));
    }
    match kind {
        FieldKind::Any => Ok(Coerced::Assign(result)),
        FieldKind::Bool => match result {
            Value::Bool(_) => Ok(Coerced::Assign(result)),
            other => Err(mismatch(kind, &other)),
        },
        FieldKind::Integer => match result {
            Value::Number(n) if n.is_i64() || n.is_u64() => {
                Ok(Coerced::Assign(Value::Number(n)))
            }
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.is_finite() => {
                    Ok(Coerced::Assign(Value::from(f as i64)))
                }
                _ => Err(format!("cannot convert non-integral number {n} to integer")),
            },
            other => Err(mismatch(kind, &other)),
        },
        FieldKind::Float => match result {
            Value::Number(n) => match n.as_f64() {
                Some(f) => Ok(Coerced::Assign(Value::from(f))),
                None => Err(format!("cannot represent {n} as float")),
            },
            other => Err(mismatch(kind, &other)),
        },
        FieldKind::String => match result {
            Value::String(_) => Ok(Coerced::Assign(result)),
            other => Err(mismatch(kind, &other)),
        },
        FieldKind::Array => match result {
            Value::Array(_) => Ok(Coerced::Assign(result)),
            other => Err(mismatch(kind, &other)),
        },
        FieldKind::Object => match result {
            Value::Object(_) => Ok(Coerced::Assign(result)),
            other => Err(mismatch(kind, &other)),
        },
        FieldKind::Record(_) => match result {
            Value::Object(_) => Ok(Coerced::Assign(result)),
            // Intermediate values (a list seeding nested fields, say) are
            // legitimate here; they travel via Sub instead of assignment.
            _ => Ok(Coerced::Skip),
        },
    }
}

fn mismatch(kind: &FieldKind, value: &Value) -> String {
    format!("cannot convert {} to {}", kind_of(value), kind.name())
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
