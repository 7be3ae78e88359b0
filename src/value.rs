//! The dynamic value tree filled in by sources and reconstructed by the
//! pipeline.
//!
//! A [`Value`] mirrors a [`TypeDescriptor`](crate::TypeDescriptor)
//! structurally. `Nil` is the single absence marker: optional values are
//! transparent (either `Nil` or the inner value), nil sequences and maps
//! are distinct from empty ones, and record values are positional,
//! aligned with their schema's field order.

use thiserror::Error;

use crate::schema::{RecordSchema, TypeDescriptor};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent: a nil pointer, sequence, map, or channel, or an unset
    /// optional leaf.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    /// Key/value pairs in insertion order; keys are unique.
    Map(Vec<(Value, Value)>),
    /// Positional member values, aligned with the record's schema.
    Record(Vec<Value>),
    Channel(ChannelValue),
    Unit,
}

/// A buffered queue of values with a fixed capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelValue {
    pub capacity: usize,
    pub items: Vec<Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    #[error("cannot represent {from} as {to}")]
    Incompatible { from: String, to: String },

    #[error("value {value} overflows {to}")]
    Overflow { value: String, to: String },

    #[error("cannot parse '{text}' as {to}: {reason}")]
    Parse {
        text: String,
        to: String,
        reason: String,
    },

    #[error("expected {expected} elements for fixed array, got {got}")]
    ArrayLength { expected: usize, got: usize },

    #[error("record arity mismatch: schema has {expected} fields, value has {got}")]
    Arity { expected: usize, got: usize },
}

impl Value {
    /// The zero value of a type: `Nil` for everything nilable, empty/zero
    /// scalars otherwise, and recursively-zero records and arrays.
    pub fn zero(ty: &TypeDescriptor) -> Value {
        match ty {
            TypeDescriptor::Bool => Value::Bool(false),
            TypeDescriptor::Int => Value::Int(0),
            TypeDescriptor::Uint => Value::Uint(0),
            TypeDescriptor::Float => Value::Float(0.0),
            TypeDescriptor::Str => Value::Str(String::new()),
            TypeDescriptor::Optional(_)
            | TypeDescriptor::Seq(_)
            | TypeDescriptor::Map(_, _)
            | TypeDescriptor::Channel(_)
            | TypeDescriptor::Opaque(_)
            | TypeDescriptor::Any => Value::Nil,
            TypeDescriptor::Array(len, elem) => {
                Value::Seq((0..*len).map(|_| Value::zero(elem)).collect())
            }
            TypeDescriptor::Record(schema) => Value::zero_record(schema),
            TypeDescriptor::Named(_, underlying) => Value::zero(underlying),
            TypeDescriptor::Unit => Value::Unit,
        }
    }

    /// A record value with every field at its zero value.
    pub fn zero_record(schema: &RecordSchema) -> Value {
        Value::Record(schema.fields().iter().map(|f| Value::zero(&f.ty)).collect())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Whether the value carries no data at all: `Nil`, or a record whose
    /// members are all absent. Used to re-nil optional blocks whose every
    /// leaf was left unset.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Record(members) => members.iter().all(Value::is_absent),
            _ => false,
        }
    }

    /// A short noun for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Channel(_) => "channel",
            Value::Unit => "unit",
        }
    }

    /// Convert this value so it is assignable to `ty`, or explain why it
    /// cannot be.
    ///
    /// Numeric kinds convert with range checks, strings parse into
    /// numerics and bools (overflow and syntax reported distinctly), and
    /// composites convert element-wise. Nil converts only to nilable
    /// targets. This is the single conversion authority used by the
    /// reassembly step, the substitution mangler's reverse, and the
    /// source adapters.
    pub fn conform(self, ty: &TypeDescriptor) -> Result<Value, ConvertError> {
        let target = ty.resolved();
        match (self, target) {
            (value, TypeDescriptor::Any) => Ok(value),
            (value, TypeDescriptor::Opaque(_)) => Ok(value),

            (Value::Nil, TypeDescriptor::Optional(_)) => Ok(Value::Nil),
            (value, TypeDescriptor::Optional(inner)) => value.conform(inner),

            (Value::Bool(b), TypeDescriptor::Bool) => Ok(Value::Bool(b)),

            (Value::Int(i), TypeDescriptor::Int) => Ok(Value::Int(i)),
            (Value::Uint(u), TypeDescriptor::Int) => {
                i64::try_from(u).map(Value::Int).map_err(|_| ConvertError::Overflow {
                    value: u.to_string(),
                    to: target.to_string(),
                })
            }
            (Value::Float(f), TypeDescriptor::Int) => {
                if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Ok(Value::Int(f as i64))
                } else {
                    Err(ConvertError::Overflow {
                        value: f.to_string(),
                        to: target.to_string(),
                    })
                }
            }

            (Value::Uint(u), TypeDescriptor::Uint) => Ok(Value::Uint(u)),
            (Value::Int(i), TypeDescriptor::Uint) => {
                u64::try_from(i).map(Value::Uint).map_err(|_| ConvertError::Overflow {
                    value: i.to_string(),
                    to: target.to_string(),
                })
            }
            (Value::Float(f), TypeDescriptor::Uint) => {
                if f.is_finite() && f >= 0.0 && f <= u64::MAX as f64 {
                    Ok(Value::Uint(f as u64))
                } else {
                    Err(ConvertError::Overflow {
                        value: f.to_string(),
                        to: target.to_string(),
                    })
                }
            }

            (Value::Float(f), TypeDescriptor::Float) => Ok(Value::Float(f)),
            (Value::Int(i), TypeDescriptor::Float) => Ok(Value::Float(i as f64)),
            (Value::Uint(u), TypeDescriptor::Float) => Ok(Value::Float(u as f64)),

            (Value::Str(s), TypeDescriptor::Str) => Ok(Value::Str(s)),
            (Value::Str(s), scalar) if scalar.is_parseable_scalar() => parse_text(&s, scalar),

            (Value::Nil, TypeDescriptor::Seq(_)) => Ok(Value::Nil),
            (Value::Seq(items), TypeDescriptor::Seq(elem)) => Ok(Value::Seq(
                items
                    .into_iter()
                    .map(|item| item.conform(elem))
                    .collect::<Result<_, _>>()?,
            )),

            (Value::Seq(items), TypeDescriptor::Array(len, elem)) => {
                if items.len() != *len {
                    return Err(ConvertError::ArrayLength {
                        expected: *len,
                        got: items.len(),
                    });
                }
                Ok(Value::Seq(
                    items
                        .into_iter()
                        .map(|item| item.conform(elem))
                        .collect::<Result<_, _>>()?,
                ))
            }

            (Value::Nil, TypeDescriptor::Map(_, _)) => Ok(Value::Nil),
            (Value::Map(pairs), TypeDescriptor::Map(key, value)) => Ok(Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| Ok((k.conform(key)?, v.conform(value)?)))
                    .collect::<Result<_, ConvertError>>()?,
            )),

            (Value::Record(members), TypeDescriptor::Record(schema)) => {
                if members.len() != schema.len() {
                    return Err(ConvertError::Arity {
                        expected: schema.len(),
                        got: members.len(),
                    });
                }
                Ok(Value::Record(
                    members
                        .into_iter()
                        .zip(schema.fields())
                        .map(|(member, field)| member.conform(&field.ty))
                        .collect::<Result<_, _>>()?,
                ))
            }

            (Value::Nil, TypeDescriptor::Channel(_)) => Ok(Value::Nil),
            (Value::Channel(ch), TypeDescriptor::Channel(elem)) => Ok(Value::Channel(ChannelValue {
                capacity: ch.capacity,
                items: ch
                    .items
                    .into_iter()
                    .map(|item| item.conform(elem))
                    .collect::<Result<_, _>>()?,
            })),

            (Value::Unit | Value::Nil, TypeDescriptor::Unit) => Ok(Value::Unit),

            (value, _) => Err(ConvertError::Incompatible {
                from: value.kind().to_string(),
                to: target.to_string(),
            }),
        }
    }

    /// Best-effort descriptor for a value, used to specialize dynamically
    /// typed fields from a template. Record values are positional and
    /// carry no field names, so they are not inferable; `Nil` reveals
    /// nothing.
    pub fn infer(&self) -> Option<TypeDescriptor> {
        match self {
            Value::Nil | Value::Record(_) => None,
            Value::Bool(_) => Some(TypeDescriptor::Bool),
            Value::Int(_) => Some(TypeDescriptor::Int),
            Value::Uint(_) => Some(TypeDescriptor::Uint),
            Value::Float(_) => Some(TypeDescriptor::Float),
            Value::Str(_) => Some(TypeDescriptor::Str),
            Value::Unit => Some(TypeDescriptor::Unit),
            Value::Seq(items) => {
                let elem = items
                    .iter()
                    .find_map(Value::infer)
                    .unwrap_or(TypeDescriptor::Any);
                Some(TypeDescriptor::seq(elem))
            }
            Value::Map(pairs) => {
                let key = pairs
                    .iter()
                    .find_map(|(k, _)| k.infer())
                    .unwrap_or(TypeDescriptor::Any);
                let value = pairs
                    .iter()
                    .find_map(|(_, v)| v.infer())
                    .unwrap_or(TypeDescriptor::Any);
                Some(TypeDescriptor::map(key, value))
            }
            Value::Channel(ch) => {
                let elem = ch
                    .items
                    .iter()
                    .find_map(Value::infer)
                    .unwrap_or(TypeDescriptor::Any);
                Some(TypeDescriptor::channel(elem))
            }
        }
    }
}

impl TypeDescriptor {
    fn is_parseable_scalar(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Bool | TypeDescriptor::Int | TypeDescriptor::Uint | TypeDescriptor::Float
        )
    }
}

/// Parse leaf text into a scalar target, reporting syntax and overflow
/// with the offending text attached.
fn parse_text(text: &str, target: &TypeDescriptor) -> Result<Value, ConvertError> {
    let parse_err = |reason: String| ConvertError::Parse {
        text: text.to_string(),
        to: target.to_string(),
        reason,
    };
    match target {
        TypeDescriptor::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(parse_err("expected 'true' or 'false'".into()))
            }
        }
        TypeDescriptor::Int => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| parse_err(e.to_string())),
        TypeDescriptor::Uint => text
            .parse::<u64>()
            .map(Value::Uint)
            .map_err(|e| parse_err(e.to_string())),
        TypeDescriptor::Float => text
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| parse_err(e.to_string())),
        _ => unreachable!("parse_text only handles parseable scalars"),
    }
}
