//! Fill reshaped values from pre-parsed documents, and extract finished
//! values into caller types.
//!
//! No parsing happens here — the caller hands in an already-parsed
//! `toml::Table` or `serde_json::Value` and this module matches its keys
//! against the reshaped schema's naming tag (field name as fallback),
//! recursing into nested records. Unmentioned fields stay absent, so a
//! filled value layers like any sparse source. `into_typed` goes the
//! other way: a reconstructed original-shape value deserializes into a
//! caller struct through serde.

use serde::de::DeserializeOwned;

use crate::error::RemoldError;
use crate::schema::{RecordSchema, TypeDescriptor};
use crate::value::{ConvertError, Value};

/// Fill a value of `schema` from a parsed TOML table, matching each field
/// by its `tag` value (field name as fallback).
pub fn fill_from_toml(
    schema: &RecordSchema,
    table: &toml::Table,
    tag: &str,
) -> Result<Value, RemoldError> {
    let mut members = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let key = field.tags.get(tag).unwrap_or(&field.name);
        let member = match table.get(key) {
            Some(raw) => toml_value(&field.ty, raw, key, tag)?,
            None => Value::zero(&field.ty),
        };
        members.push(member);
    }
    Ok(Value::Record(members))
}

fn toml_value(
    ty: &TypeDescriptor,
    raw: &toml::Value,
    key: &str,
    tag: &str,
) -> Result<Value, RemoldError> {
    if let Some(nested) = nested_record(ty) {
        return match raw {
            toml::Value::Table(table) => fill_from_toml(nested, table, tag),
            other => Err(invalid(key, other.type_str(), "table")),
        };
    }
    let loose = loose_toml(raw);
    loose
        .conform(ty)
        .map_err(|source| RemoldError::InvalidValue {
            key: key.to_string(),
            source,
        })
}

/// Untyped TOML-to-value mapping; `conform` finishes the job against the
/// field's declared type.
fn loose_toml(raw: &toml::Value) -> Value {
    match raw {
        toml::Value::String(s) => Value::Str(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
        toml::Value::Array(items) => Value::Seq(items.iter().map(loose_toml).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .iter()
                .map(|(k, v)| (Value::Str(k.clone()), loose_toml(v)))
                .collect(),
        ),
    }
}

/// Fill a value of `schema` from a parsed JSON object, matching each
/// field by its `tag` value (field name as fallback).
pub fn fill_from_json(
    schema: &RecordSchema,
    document: &serde_json::Value,
    tag: &str,
) -> Result<Value, RemoldError> {
    let serde_json::Value::Object(object) = document else {
        return Err(invalid("<document>", json_kind(document), "object"));
    };

    let mut members = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let key = field.tags.get(tag).unwrap_or(&field.name);
        let member = match object.get(key) {
            Some(serde_json::Value::Null) | None => Value::zero(&field.ty),
            Some(raw) => json_value(&field.ty, raw, key, tag)?,
        };
        members.push(member);
    }
    Ok(Value::Record(members))
}

fn json_value(
    ty: &TypeDescriptor,
    raw: &serde_json::Value,
    key: &str,
    tag: &str,
) -> Result<Value, RemoldError> {
    if let Some(nested) = nested_record(ty) {
        return match raw {
            serde_json::Value::Object(_) => fill_from_json(nested, raw, tag),
            other => Err(invalid(key, json_kind(other), "object")),
        };
    }
    loose_json(raw)
        .conform(ty)
        .map_err(|source| RemoldError::InvalidValue {
            key: key.to_string(),
            source,
        })
}

fn loose_json(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::Uint(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::Seq(items.iter().map(loose_json).collect()),
        serde_json::Value::Object(object) => Value::Map(
            object
                .iter()
                .map(|(k, v)| (Value::Str(k.clone()), loose_json(v)))
                .collect(),
        ),
    }
}

/// Render an original-shape value as JSON keyed by field names.
pub fn to_json(schema: &RecordSchema, value: &Value) -> Result<serde_json::Value, RemoldError> {
    let Value::Record(members) = value else {
        return Err(RemoldError::Schema {
            field: "<record>".into(),
            reason: format!("expected a record value, got {}", value.kind()),
        });
    };
    if members.len() != schema.len() {
        return Err(RemoldError::Schema {
            field: "<record>".into(),
            reason: format!(
                "value has {} members for {} fields",
                members.len(),
                schema.len()
            ),
        });
    }

    let mut object = serde_json::Map::with_capacity(members.len());
    for (field, member) in schema.fields().iter().zip(members) {
        object.insert(
            field.name.clone(),
            value_to_json(&field.ty, member, &field.name)?,
        );
    }
    Ok(serde_json::Value::Object(object))
}

/// Deserialize a reconstructed original-shape value into a caller type.
pub fn into_typed<T: DeserializeOwned>(
    schema: &RecordSchema,
    value: &Value,
) -> Result<T, RemoldError> {
    let json = to_json(schema, value)?;
    serde_json::from_value(json).map_err(|e| RemoldError::Schema {
        field: "<record>".into(),
        reason: e.to_string(),
    })
}

static ANY: TypeDescriptor = TypeDescriptor::Any;

fn value_to_json(
    ty: &TypeDescriptor,
    value: &Value,
    field: &str,
) -> Result<serde_json::Value, RemoldError> {
    let ty = ty.resolved();
    if let TypeDescriptor::Optional(inner) = ty {
        return value_to_json(inner, value, field);
    }
    match value {
        Value::Nil | Value::Unit => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(i) => Ok(serde_json::Value::from(*i)),
        Value::Uint(u) => Ok(serde_json::Value::from(*u)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| RemoldError::Schema {
                field: field.to_string(),
                reason: format!("{f} has no JSON representation"),
            }),
        Value::Str(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Seq(items) => {
            let elem = match ty {
                TypeDescriptor::Seq(elem) | TypeDescriptor::Array(_, elem) => elem.as_ref(),
                _ => &ANY,
            };
            Ok(serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| value_to_json(elem, item, field))
                    .collect::<Result<_, _>>()?,
            ))
        }
        Value::Map(pairs) => {
            let value_ty = match ty {
                TypeDescriptor::Map(_, value_ty) => value_ty.as_ref(),
                _ => &ANY,
            };
            let mut object = serde_json::Map::with_capacity(pairs.len());
            for (k, v) in pairs {
                let Value::Str(key) = k else {
                    return Err(RemoldError::Schema {
                        field: field.to_string(),
                        reason: format!("map key is {}, JSON keys must be strings", k.kind()),
                    });
                };
                object.insert(key.clone(), value_to_json(value_ty, v, field)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        Value::Record(_) => match ty {
            TypeDescriptor::Record(nested) => to_json(nested, value),
            _ => Err(RemoldError::Schema {
                field: field.to_string(),
                reason: "record value without a record schema".into(),
            }),
        },
        Value::Channel(_) => Err(RemoldError::Schema {
            field: field.to_string(),
            reason: "channels have no JSON representation".into(),
        }),
    }
}

/// The record schema behind a field a document can nest into: a record,
/// possibly behind optional layers.
fn nested_record(ty: &TypeDescriptor) -> Option<&RecordSchema> {
    match ty.resolved() {
        TypeDescriptor::Record(schema) => Some(schema),
        TypeDescriptor::Optional(inner) => nested_record(inner),
        _ => None,
    }
}

fn invalid(key: &str, got: &str, expected: &str) -> RemoldError {
    RemoldError::InvalidValue {
        key: key.to_string(),
        source: ConvertError::Incompatible {
            from: got.to_string(),
            to: expected.to_string(),
        },
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
