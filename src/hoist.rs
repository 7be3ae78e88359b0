//! Hoisting of embedded record fields into their parent.
//!
//! An embedded field whose type is a record (or a pointer to one) is
//! replaced by that record's own public fields; chains of embedding hoist
//! transitively in one pass. The engine recursion flag is on, so embeds
//! inside ordinary nested record fields get the same treatment through
//! sub-pipelines. The reverse pass reassembles the hoisted values and
//! treats an optional embed as absent when every hoisted value is — an
//! omitted block stays omitted instead of coming back as all-zero fields.

use crate::mangler::{FieldValue, Mangler, StageError, expect_one};
use crate::schema::{FieldDescriptor, RecordSchema, TypeDescriptor};
use crate::value::Value;

pub struct HoistMangler;

impl HoistMangler {
    pub fn new() -> Self {
        HoistMangler
    }

    fn collect(&self, schema: &RecordSchema, out: &mut Vec<FieldDescriptor>) {
        for field in schema.fields().iter().filter(|f| f.public) {
            match hoistable(field) {
                Some(nested) => self.collect(nested, out),
                None => out.push(field.clone()),
            }
        }
    }
}

impl Default for HoistMangler {
    fn default() -> Self {
        HoistMangler::new()
    }
}

impl Mangler for HoistMangler {
    fn name(&self) -> &'static str {
        "hoist"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        match hoistable(field) {
            Some(schema) => {
                let mut out = Vec::new();
                self.collect(schema, &mut out);
                Ok(out)
            }
            None => Ok(vec![field.clone()]),
        }
    }

    fn unmangle(
        &self,
        field: &FieldDescriptor,
        produced: Vec<FieldValue>,
    ) -> Result<Value, StageError> {
        if hoistable(field).is_none() {
            return Ok(expect_one(produced)?.value);
        }

        let expected = hoisted_count(field);
        if produced.len() != expected {
            return Err(StageError::ValueCount {
                expected,
                got: produced.len(),
            });
        }
        let mut supply = produced.into_iter();
        let (value, _) = rebuild(field, &mut supply);
        Ok(value)
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}

/// The record schema an embedded field hoists, looking through a pointer.
/// Non-embedded fields and non-record embeds are not hoisted.
fn hoistable(field: &FieldDescriptor) -> Option<&RecordSchema> {
    if !field.embedded {
        return None;
    }
    match field.ty.resolved() {
        TypeDescriptor::Record(schema) => Some(schema),
        TypeDescriptor::Optional(inner) => match inner.resolved() {
            TypeDescriptor::Record(schema) => Some(schema),
            _ => None,
        },
        _ => None,
    }
}

fn hoisted_count(field: &FieldDescriptor) -> usize {
    match hoistable(field) {
        Some(schema) => schema
            .fields()
            .iter()
            .filter(|f| f.public)
            .map(hoisted_count)
            .sum(),
        None => 1,
    }
}

/// Reassemble the embedded record in hoist order. An optional embed whose
/// hoisted values are all absent collapses back to nil.
fn rebuild(field: &FieldDescriptor, supply: &mut impl Iterator<Item = FieldValue>) -> (Value, bool) {
    match hoistable(field) {
        Some(schema) => {
            let mut members = Vec::with_capacity(schema.len());
            let mut present = false;
            for member in schema.fields() {
                if !member.public {
                    members.push(Value::zero(&member.ty));
                    continue;
                }
                let (value, value_present) = rebuild(member, supply);
                present |= value_present;
                members.push(value);
            }
            let optional = matches!(field.ty.resolved(), TypeDescriptor::Optional(_));
            if !present && optional {
                (Value::Nil, false)
            } else {
                (Value::Record(members), present)
            }
        }
        None => {
            let tuple = supply
                .next()
                .expect("remold: hoisted positions counted before rebuild");
            let present = !tuple.value.is_absent();
            (tuple.value, present)
        }
    }
}
