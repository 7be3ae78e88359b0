//! Opaque-text fields as optional strings.
//!
//! Types satisfying the opaque-text contract are never decomposed; this
//! mangler is how they interoperate with sources that can only supply
//! text. The forward pass rewrites any opaque-typed field into a single
//! optional string; the reverse pass hands the string to the type's
//! constructor, and an absent string leaves the field at its zero value.

use crate::mangler::{FieldValue, Mangler, StageError, expect_one};
use crate::schema::{FieldDescriptor, OpaqueType, TypeDescriptor};
use crate::value::Value;

pub struct TextMangler;

impl TextMangler {
    pub fn new() -> Self {
        TextMangler
    }
}

impl Default for TextMangler {
    fn default() -> Self {
        TextMangler::new()
    }
}

/// The opaque contract behind a field's type, looking through one
/// optional layer (the shape normalization produces).
fn opaque_of(ty: &TypeDescriptor) -> Option<&OpaqueType> {
    match ty.resolved() {
        TypeDescriptor::Opaque(opaque) => Some(opaque),
        TypeDescriptor::Optional(inner) => match inner.resolved() {
            TypeDescriptor::Opaque(opaque) => Some(opaque),
            _ => None,
        },
        _ => None,
    }
}

impl Mangler for TextMangler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        match opaque_of(&field.ty) {
            Some(_) => {
                let mut out = field.clone();
                out.ty = TypeDescriptor::optional(TypeDescriptor::Str);
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
        let Some(opaque) = opaque_of(&field.ty) else {
            return Ok(value);
        };
        match value {
            Value::Nil => Ok(Value::zero(&field.ty)),
            Value::Str(text) => opaque.construct(&text).map_err(|reason| StageError::Text {
                ty: opaque.name().to_string(),
                reason,
            }),
            other => Err(StageError::Convert(
                crate::value::ConvertError::Incompatible {
                    from: other.kind().to_string(),
                    to: "option<string>".to_string(),
                },
            )),
        }
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}
