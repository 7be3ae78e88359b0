//! Set fields as sequences.
//!
//! A set is a map whose value type is the unit type. Sources deal in
//! sequences, so the forward pass rewrites `map<K, unit>` to `[K]`; the
//! reverse pass rebuilds the map, silently deduplicating, and keeps a nil
//! sequence as a nil set.

use crate::mangler::{FieldValue, Mangler, StageError, expect_one};
use crate::schema::{FieldDescriptor, TypeDescriptor};
use crate::value::Value;

pub struct SetMangler;

impl SetMangler {
    pub fn new() -> Self {
        SetMangler
    }
}

impl Default for SetMangler {
    fn default() -> Self {
        SetMangler::new()
    }
}

/// The key type of a set field, if this is one.
fn set_key(ty: &TypeDescriptor) -> Option<&TypeDescriptor> {
    match ty.resolved() {
        TypeDescriptor::Map(key, value) if matches!(value.resolved(), TypeDescriptor::Unit) => {
            Some(key.as_ref())
        }
        _ => None,
    }
}

impl Mangler for SetMangler {
    fn name(&self) -> &'static str {
        "set-slice"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        match set_key(&field.ty) {
            Some(key) => {
                let mut out = field.clone();
                out.ty = TypeDescriptor::seq(key.clone());
                Ok(vec![out])
            }
            None => Ok(vec![field.clone()]),
        }
    }

    fn unmangle(
        &self,
        field: &FieldDescriptor,
        produced: Vec<FieldValue>,
    ) -> Result<Value, StageError> {
        let value = expect_one(produced)?.value;
        if set_key(&field.ty).is_none() {
            return Ok(value);
        }
        match value {
            Value::Nil => Ok(Value::Nil),
            Value::Seq(items) => {
                let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(items.len());
                for item in items {
                    if !pairs.iter().any(|(existing, _)| *existing == item) {
                        pairs.push((item, Value::Unit));
                    }
                }
                Ok(Value::Map(pairs))
            }
            other => Err(StageError::Convert(crate::value::ConvertError::Incompatible {
                from: other.kind().to_string(),
                to: field.ty.to_string(),
            })),
        }
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}
