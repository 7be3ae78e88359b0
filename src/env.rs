//! Fill a reshaped schema's value from environment variables.
//!
//! Meant for a schema that has already been flattened: each field maps to
//! one variable, `{PREFIX}_{KEY}` with the key uppercased. The key comes
//! from the field's naming tag when present, the field name otherwise.
//! Leaf text is converted through the same checked conversion the
//! pipeline uses, so `PORT=70000` for a `u16`-ish leaf fails with the
//! variable named rather than silently wrapping.
//!
//! Takes an iterator so tests can pass synthetic data instead of
//! `std::env::vars()`.

use crate::error::RemoldError;
use crate::schema::RecordSchema;
use crate::value::Value;

/// Fill a value of `schema` from `{prefix}_{KEY}` variables.
///
/// Unmatched fields stay at their zero value, so the result layers like
/// any other sparse source. Variables not matching the prefix are
/// ignored.
pub fn fill_from_env(
    schema: &RecordSchema,
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
    tag: &str,
) -> Result<Value, RemoldError> {
    let vars: Vec<(String, String)> = vars.into_iter().collect();

    let mut members = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let key = field.tags.get(tag).unwrap_or(&field.name);
        let wanted = format!("{prefix}_{}", key.to_uppercase());

        let supplied = vars.iter().find(|(name, _)| *name == wanted);
        let member = match supplied {
            Some((_, text)) => Value::Str(text.clone())
                .conform(&field.ty)
                .map_err(|source| RemoldError::InvalidValue {
                    key: wanted.clone(),
                    source,
                })?,
            None => Value::zero(&field.ty),
        };
        members.push(member);
    }
    Ok(Value::Record(members))
}
