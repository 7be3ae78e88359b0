//! Single-type substitution: replace every occurrence of one type with
//! another, wherever it sits in a field's type structure.
//!
//! Generic over a `from` and a `to` type; constructible only when a value
//! of `to` can be converted back into `from`. The forward pass is purely
//! type-level — `from` is swapped for `to` whether the field's type *is*
//! `from` or has it nested under any depth of optional, sequence, array,
//! map key/value, or channel wrappers, with the surrounding structure kept
//! intact. The reverse pass mirrors the same structure on the value,
//! short-circuiting nil wrappers and refilling channels at their original
//! capacity.

use crate::error::RemoldError;
use crate::mangler::{FieldValue, Mangler, StageError, expect_one};
use crate::schema::{FieldDescriptor, TypeDescriptor};
use crate::value::{ChannelValue, Value};

#[derive(Debug)]
pub struct SubstituteMangler {
    from: TypeDescriptor,
    to: TypeDescriptor,
}

impl SubstituteMangler {
    /// Fails when `to` values cannot be converted back into `from` — a
    /// substitution that cannot be inverted is refused up front.
    pub fn new(from: TypeDescriptor, to: TypeDescriptor) -> Result<Self, RemoldError> {
        if !convertible(&to, &from) {
            return Err(RemoldError::NotConvertible {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(SubstituteMangler { from, to })
    }

    /// Swap `from` for `to` through wrapper structure. `None` means no
    /// occurrence. Records are left to engine recursion; named types are
    /// atomic unless they are `from` themselves.
    fn substitute(&self, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        if *ty == self.from {
            return Some(self.to.clone());
        }
        match ty {
            TypeDescriptor::Optional(inner) => {
                self.substitute(inner).map(TypeDescriptor::optional)
            }
            TypeDescriptor::Seq(elem) => self.substitute(elem).map(TypeDescriptor::seq),
            TypeDescriptor::Array(len, elem) => self
                .substitute(elem)
                .map(|elem| TypeDescriptor::array(*len, elem)),
            TypeDescriptor::Map(key, value) => {
                let new_key = self.substitute(key);
                let new_value = self.substitute(value);
                if new_key.is_none() && new_value.is_none() {
                    return None;
                }
                Some(TypeDescriptor::map(
                    new_key.unwrap_or_else(|| (**key).clone()),
                    new_value.unwrap_or_else(|| (**value).clone()),
                ))
            }
            TypeDescriptor::Channel(elem) => self.substitute(elem).map(TypeDescriptor::channel),
            _ => None,
        }
    }

    /// Mirror-image value conversion: walk the original type's structure,
    /// converting wherever `from` was substituted.
    fn restore(&self, ty: &TypeDescriptor, value: Value) -> Result<Value, StageError> {
        if *ty == self.from {
            return Ok(value.conform(&self.from)?);
        }
        match ty {
            TypeDescriptor::Optional(inner) => match value {
                Value::Nil => Ok(Value::Nil),
                inner_value => self.restore(inner, inner_value),
            },
            TypeDescriptor::Seq(elem) => match value {
                Value::Nil => Ok(Value::Nil),
                Value::Seq(items) => Ok(Value::Seq(
                    items
                        .into_iter()
                        .map(|item| self.restore(elem, item))
                        .collect::<Result<_, _>>()?,
                )),
                other => Err(shape_error(&other, ty)),
            },
            TypeDescriptor::Array(_, elem) => match value {
                Value::Seq(items) => Ok(Value::Seq(
                    items
                        .into_iter()
                        .map(|item| self.restore(elem, item))
                        .collect::<Result<_, _>>()?,
                )),
                other => Err(shape_error(&other, ty)),
            },
            TypeDescriptor::Map(key, value_ty) => match value {
                Value::Nil => Ok(Value::Nil),
                Value::Map(pairs) => Ok(Value::Map(
                    pairs
                        .into_iter()
                        .map(|(k, v)| Ok((self.restore(key, k)?, self.restore(value_ty, v)?)))
                        .collect::<Result<_, StageError>>()?,
                )),
                other => Err(shape_error(&other, ty)),
            },
            TypeDescriptor::Channel(elem) => match value {
                Value::Nil => Ok(Value::Nil),
                // Drain into a fresh channel of the original element type,
                // capacity unchanged.
                Value::Channel(ch) => Ok(Value::Channel(ChannelValue {
                    capacity: ch.capacity,
                    items: ch
                        .items
                        .into_iter()
                        .map(|item| self.restore(elem, item))
                        .collect::<Result<_, _>>()?,
                })),
                other => Err(shape_error(&other, ty)),
            },
            _ => Ok(value),
        }
    }
}

fn shape_error(value: &Value, ty: &TypeDescriptor) -> StageError {
    StageError::Convert(crate::value::ConvertError::Incompatible {
        from: value.kind().to_string(),
        to: ty.to_string(),
    })
}

impl Mangler for SubstituteMangler {
    fn name(&self) -> &'static str {
        "substitute"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        match self.substitute(&field.ty) {
            Some(ty) => {
                let mut out = field.clone();
                out.ty = ty;
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
        self.restore(&field.ty, value)
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}

/// Whether a value of `src` can be converted into `dst` by
/// [`Value::conform`]: numeric kinds interconvert, text parses into
/// scalars, composites convert element-wise.
fn convertible(src: &TypeDescriptor, dst: &TypeDescriptor) -> bool {
    use TypeDescriptor::*;
    let (src, dst) = (src.resolved(), dst.resolved());
    match (src, dst) {
        (_, Any) => true,
        (_, Opaque(_)) => true,
        (a, b) if a == b => true,
        (Int | Uint | Float, Int | Uint | Float) => true,
        (Str, Int | Uint | Float | Bool) => true,
        (Optional(a), Optional(b)) => convertible(a, b),
        (Seq(a), Seq(b)) => convertible(a, b),
        (Array(n, a), Array(m, b)) => n == m && convertible(a, b),
        (Map(ka, va), Map(kb, vb)) => convertible(ka, kb) && convertible(va, vb),
        (Channel(a), Channel(b)) => convertible(a, b),
        (Record(a), Record(b)) => {
            a.len() == b.len()
                && a.fields()
                    .iter()
                    .zip(b.fields())
                    .all(|(fa, fb)| convertible(&fa.ty, &fb.ty))
        }
        _ => false,
    }
}
