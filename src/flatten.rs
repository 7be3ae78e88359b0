//! Flattening of nested records into a single level of leaf fields.
//!
//! `Outer { database: Inner { url } }` becomes one field per leaf, named
//! by the concatenated ancestor chain (`DatabaseUrl`) and tagged under the
//! caller's key in the caller's convention (`database_url`). The reverse
//! pass walks the original nested shape depth-first, consuming produced
//! values in expansion order, and re-nils optional sub-records whose every
//! leaf was left absent.

use crate::case::{Convention, decode, encode};
use crate::mangler::{FieldValue, Mangler, StageError, expect_one};
use crate::schema::{FieldDescriptor, RecordSchema, TypeDescriptor};
use crate::value::Value;

/// Expands record fields (directly record-typed, or a pointer to one)
/// into their leaves, eagerly and recursively. Declares no engine
/// recursion of its own — the expansion happens entirely in `mangle`.
pub struct FlattenMangler {
    tag: String,
    convention: Convention,
}

impl FlattenMangler {
    /// `tag` is the metadata key to write flattened names under;
    /// `convention` is the naming style of those tag values.
    pub fn new(tag: &str, convention: Convention) -> Self {
        FlattenMangler {
            tag: tag.to_string(),
            convention,
        }
    }

    fn expand(
        &self,
        schema: &RecordSchema,
        chain: &[String],
        out: &mut Vec<FieldDescriptor>,
    ) -> Result<(), StageError> {
        for field in schema.fields().iter().filter(|f| f.public) {
            let mut tokens = chain.to_vec();
            tokens.extend(decode(&field.name)?);

            match expandable(&field.ty) {
                Some(nested) => self.expand(nested, &tokens, out)?,
                None => {
                    let mut leaf = FieldDescriptor::new(
                        &encode(&tokens, Convention::Pascal),
                        field.ty.clone(),
                    );
                    leaf.tags = field.tags.clone();
                    leaf.tags.set(&self.tag, &encode(&tokens, self.convention));
                    out.push(leaf);
                }
            }
        }
        Ok(())
    }
}

impl Mangler for FlattenMangler {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        let tokens = decode(&field.name)?;
        match expandable(&field.ty) {
            Some(schema) => {
                let mut leaves = Vec::new();
                self.expand(schema, &tokens, &mut leaves)?;
                Ok(leaves)
            }
            None => {
                let mut out = field.clone();
                out.tags.set(&self.tag, &encode(&tokens, self.convention));
                Ok(vec![out])
            }
        }
    }

    fn unmangle(
        &self,
        field: &FieldDescriptor,
        produced: Vec<FieldValue>,
    ) -> Result<Value, StageError> {
        if expandable(&field.ty).is_none() {
            return Ok(expect_one(produced)?.value);
        }

        let expected = leaf_count(&field.ty);
        if produced.len() != expected {
            return Err(StageError::ValueCount {
                expected,
                got: produced.len(),
            });
        }
        let mut supply = produced.into_iter();
        let (value, _) = rebuild(&field.ty, &mut supply);
        Ok(value)
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        false
    }
}

/// The nested schema behind a field type that flattening expands: a
/// record, possibly behind optional layers. Sequences and maps of records
/// are leaves — they flatten as a whole or not at all.
fn expandable(ty: &TypeDescriptor) -> Option<&RecordSchema> {
    match ty.resolved() {
        TypeDescriptor::Record(schema) => Some(schema),
        TypeDescriptor::Optional(inner) => expandable(inner),
        _ => None,
    }
}

/// The number of leaf positions the expansion of `ty` produces.
fn leaf_count(ty: &TypeDescriptor) -> usize {
    match expandable(ty) {
        Some(schema) => schema
            .fields()
            .iter()
            .filter(|f| f.public)
            .map(|f| leaf_count(&f.ty))
            .sum(),
        None => 1,
    }
}

/// Depth-first reconstruction mirroring the expansion order. Returns the
/// rebuilt value and whether anything under it was actually present, so
/// optional layers can collapse back to nil.
fn rebuild(ty: &TypeDescriptor, supply: &mut impl Iterator<Item = FieldValue>) -> (Value, bool) {
    match expandable(ty) {
        Some(schema) => {
            let mut members = Vec::with_capacity(schema.len());
            let mut present = false;
            for field in schema.fields() {
                if !field.public {
                    members.push(Value::zero(&field.ty));
                    continue;
                }
                let (value, value_present) = rebuild(&field.ty, supply);
                present |= value_present;
                members.push(value);
            }
            if !present && matches!(ty.resolved(), TypeDescriptor::Optional(_)) {
                (Value::Nil, false)
            } else {
                (Value::Record(members), present)
            }
        }
        None => {
            let tuple = supply
                .next()
                .expect("remold: leaf positions counted before rebuild");
            let present = !tuple.value.is_absent();
            (tuple.value, present)
        }
    }
}
