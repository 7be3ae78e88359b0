//! The transformation engine: apply an ordered mangler list to a schema,
//! hand out a reshaped value to fill, then invert the whole composition.
//!
//! A [`Translator`] owns the per-stage bookkeeping that makes inversion
//! possible: for every stage and every input field it records which output
//! fields that stage produced, and — for record-shaped outputs the mangler
//! asked to recurse into — a sub-translator scoped to that one mangler and
//! that field's nested schema. Recursion runs outside-in on the forward
//! pass (a mangler sees the already-mangled shape of a nested field before
//! the engine descends into it) and inside-out on the reverse pass (nested
//! values are resolved before the owning stage's `unmangle` runs). That
//! ordering keeps the two passes exact inverses for any mangler
//! composition that honors the field-count/order contract.
//!
//! A translator is not reentrant across independent data cycles: each
//! `translate` call rebuilds stage state, and exactly one `reverse` call
//! is expected against that call's output. Schemas and manglers are
//! immutable and freely shared; the translator itself is not.

use std::sync::Arc;

use crate::error::RemoldError;
use crate::mangler::{FieldValue, Mangler};
use crate::schema::{FieldDescriptor, RecordSchema, Wrap, record_shape, rebuild_shape};
use crate::value::Value;

/// Applies an ordered list of [`Mangler`]s to one record schema and
/// replays them in reverse to reconstruct a value of the original shape.
pub struct Translator {
    schema: RecordSchema,
    manglers: Vec<Arc<dyn Mangler>>,
    stages: Vec<Stage>,
    reshaped: Option<RecordSchema>,
}

/// Bookkeeping for one mangler's pass over the field list.
struct Stage {
    index: usize,
    mangler: Arc<dyn Mangler>,
    entries: Vec<StageEntry>,
}

/// One input field's forward record: the outputs it produced, in order.
/// The reverse pass hands exactly this many values back to `unmangle`.
struct StageEntry {
    input: FieldDescriptor,
    outputs: Vec<OutputSlot>,
    /// Non-public fields are never presented to the mangler; their single
    /// slot passes the value through untouched.
    skipped: bool,
}

struct OutputSlot {
    /// The field as the mangler emitted it, before any nested reshaping
    /// was spliced into its type. This is what `unmangle` sees.
    field: FieldDescriptor,
    nested: Option<NestedPipeline>,
}

/// A sub-translator owned by its parent slot, scoped to one mangler and
/// one nested record schema, torn down with the stage state.
struct NestedPipeline {
    wraps: Vec<Wrap>,
    sub: Box<Translator>,
}

impl Translator {
    pub fn new(schema: RecordSchema, manglers: Vec<Arc<dyn Mangler>>) -> Self {
        Translator {
            schema,
            manglers,
            stages: Vec::new(),
            reshaped: None,
        }
    }

    /// The original schema this translator was built over.
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// The reshaped schema produced by the last `translate` call.
    pub fn reshaped(&self) -> Option<&RecordSchema> {
        self.reshaped.as_ref()
    }

    /// Run every mangler in order over the schema and return a zero value
    /// of the final reshaped schema for a source adapter to fill in.
    ///
    /// Any prior stage state is discarded, so a translator can run
    /// repeated translate/reverse cycles in sequence.
    pub fn translate(&mut self) -> Result<Value, RemoldError> {
        self.stages.clear();
        self.reshaped = None;

        // Non-public fields never enter the pipeline; their anchor-less
        // absence here is what keeps them zero in the reassembled record.
        let mut current: Vec<FieldDescriptor> = self
            .schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.public)
            .map(|(position, field)| {
                let mut field = field.clone();
                field.anchor = Some(position);
                field
            })
            .collect();

        for (stage_index, mangler) in self.manglers.iter().enumerate() {
            let mut entries = Vec::new();
            let mut next = Vec::new();

            for (field_index, field) in current.iter().enumerate() {
                if !field.public {
                    entries.push(StageEntry {
                        input: field.clone(),
                        outputs: vec![OutputSlot {
                            field: field.clone(),
                            nested: None,
                        }],
                        skipped: true,
                    });
                    next.push(field.clone());
                    continue;
                }

                let outputs =
                    mangler
                        .mangle(field)
                        .map_err(|source| RemoldError::Mangle {
                            stage: stage_index,
                            mangler: mangler.name(),
                            field: field.name.clone(),
                            index: field_index,
                            source,
                        })?;

                let mut slots = Vec::with_capacity(outputs.len());
                for mut out in outputs {
                    // Freshly produced fields lose any position anchor;
                    // only an unchanged pass-through keeps its place in
                    // the outermost record.
                    out.anchor = if out == *field { field.anchor } else { None };

                    let shape = if mangler.recurse(&out) {
                        record_shape(&out.ty).map(|(wraps, nested)| (wraps, nested.clone()))
                    } else {
                        None
                    };

                    match shape {
                        Some((wraps, nested_schema)) => {
                            let mut sub =
                                Translator::new(nested_schema, vec![Arc::clone(mangler)]);
                            sub.translate().map_err(|e| RemoldError::Nested {
                                field: out.name.clone(),
                                source: Box::new(e),
                            })?;
                            let reshaped_nested = sub
                                .reshaped
                                .clone()
                                .expect("remold: translate populates the reshaped schema");

                            let pre_splice = out.clone();
                            out.ty = rebuild_shape(&wraps, reshaped_nested);
                            next.push(out);
                            slots.push(OutputSlot {
                                field: pre_splice,
                                nested: Some(NestedPipeline {
                                    wraps,
                                    sub: Box::new(sub),
                                }),
                            });
                        }
                        None => {
                            next.push(out.clone());
                            slots.push(OutputSlot {
                                field: out,
                                nested: None,
                            });
                        }
                    }
                }

                entries.push(StageEntry {
                    input: field.clone(),
                    outputs: slots,
                    skipped: false,
                });
            }

            self.stages.push(Stage {
                index: stage_index,
                mangler: Arc::clone(mangler),
                entries,
            });
            current = next;
        }

        let reshaped = RecordSchema::new(current);
        let value = Value::zero_record(&reshaped);
        self.reshaped = Some(reshaped);
        Ok(value)
    }

    /// Invert the last `translate` call: walk the stages in reverse,
    /// resolving nested sub-pipelines inside-out, and reassemble a value
    /// of the original schema through each surviving field's retained
    /// position anchor.
    pub fn reverse(&self, filled: Value) -> Result<Value, RemoldError> {
        let reshaped = self.reshaped.as_ref().ok_or(RemoldError::NotTranslated)?;

        let members = match filled {
            Value::Record(members) => members,
            other => panic!(
                "remold: reshaped value must be a record, got {}",
                other.kind()
            ),
        };
        // A count mismatch here or below is a broken mangler contract, not
        // a data problem — the only invariant violation treated as fatal.
        assert_eq!(
            members.len(),
            reshaped.len(),
            "remold: reshaped value has {} members for {} schema fields",
            members.len(),
            reshaped.len(),
        );

        let mut tuples: Vec<FieldValue> = reshaped
            .fields()
            .iter()
            .cloned()
            .zip(members)
            .map(|(field, value)| FieldValue { field, value })
            .collect();

        for stage in self.stages.iter().rev() {
            tuples = self.reverse_stage(stage, tuples)?;
        }

        let mut out: Vec<Value> = self
            .schema
            .fields()
            .iter()
            .map(|field| Value::zero(&field.ty))
            .collect();
        for tuple in tuples {
            let Some(position) = tuple.field.anchor else {
                continue;
            };
            let declared = &self.schema.fields()[position];
            let produced = tuple.value.kind();
            out[position] =
                tuple
                    .value
                    .conform(&declared.ty)
                    .map_err(|_| RemoldError::Reassembly {
                        field: declared.name.clone(),
                        declared: declared.ty.to_string(),
                        produced: produced.to_string(),
                    })?;
        }
        Ok(Value::Record(out))
    }

    fn reverse_stage(
        &self,
        stage: &Stage,
        tuples: Vec<FieldValue>,
    ) -> Result<Vec<FieldValue>, RemoldError> {
        let produced_total: usize = stage.entries.iter().map(|e| e.outputs.len()).sum();
        assert_eq!(
            tuples.len(),
            produced_total,
            "remold: stage {} received {} values for {} produced fields",
            stage.index,
            tuples.len(),
            produced_total,
        );

        let mut supply = tuples.into_iter();
        let mut results = Vec::with_capacity(stage.entries.len());

        for (entry_index, entry) in stage.entries.iter().enumerate() {
            let mut resolved = Vec::with_capacity(entry.outputs.len());
            for slot in &entry.outputs {
                let tuple = supply
                    .next()
                    .expect("remold: produced-value count checked above");
                resolved.push(self.resolve_slot(slot, tuple)?);
            }

            let value = if entry.skipped {
                resolved
                    .pop()
                    .expect("remold: skipped entries have exactly one slot")
                    .value
            } else {
                stage
                    .mangler
                    .unmangle(&entry.input, resolved)
                    .map_err(|source| RemoldError::Unmangle {
                        stage: stage.index,
                        mangler: stage.mangler.name(),
                        field: entry.input.name.clone(),
                        index: entry_index,
                        source,
                    })?
            };
            results.push(FieldValue {
                field: entry.input.clone(),
                value,
            });
        }
        Ok(results)
    }

    /// Resolve one produced value: plain slots pass through, slots with a
    /// nested pipeline reverse-translate their substructure first.
    fn resolve_slot(
        &self,
        slot: &OutputSlot,
        tuple: FieldValue,
    ) -> Result<FieldValue, RemoldError> {
        let Some(pipeline) = &slot.nested else {
            return Ok(tuple);
        };
        let value = reverse_nested(&pipeline.wraps, &pipeline.sub, &slot.field.name, tuple.value)
            .map_err(|e| RemoldError::Nested {
                field: slot.field.name.clone(),
                source: Box::new(e),
            })?;
        Ok(FieldValue {
            field: slot.field.clone(),
            value,
        })
    }
}

/// Reverse-translate a nested value through its wrapper chain: nil
/// pointers and sequences stay nil without recursing, sequence and array
/// elements are each reversed and reassembled.
fn reverse_nested(
    wraps: &[Wrap],
    sub: &Translator,
    field: &str,
    value: Value,
) -> Result<Value, RemoldError> {
    match wraps.first() {
        None => sub.reverse(value),
        Some(Wrap::Opt) => match value {
            Value::Nil => Ok(Value::Nil),
            inner => reverse_nested(&wraps[1..], sub, field, inner),
        },
        Some(Wrap::Seq | Wrap::Array(_)) => match value {
            Value::Nil => Ok(Value::Nil),
            Value::Seq(items) => Ok(Value::Seq(
                items
                    .into_iter()
                    .map(|item| reverse_nested(&wraps[1..], sub, field, item))
                    .collect::<Result<_, _>>()?,
            )),
            other => Err(RemoldError::Schema {
                field: field.to_string(),
                reason: format!("expected a sequence, got {}", other.kind()),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mangler::{StageError, expect_one};
    use crate::schema::TypeDescriptor;

    /// Renames fields with a prefix; optionally recurses into records.
    struct Prefix {
        prefix: &'static str,
        deep: bool,
    }

    impl Mangler for Prefix {
        fn name(&self) -> &'static str {
            "prefix"
        }

        fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
            let mut out = field.clone();
            out.name = format!("{}{}", self.prefix, field.name);
            Ok(vec![out])
        }

        fn unmangle(
            &self,
            _field: &FieldDescriptor,
            produced: Vec<FieldValue>,
        ) -> Result<Value, StageError> {
            Ok(expect_one(produced)?.value)
        }

        fn recurse(&self, _field: &FieldDescriptor) -> bool {
            self.deep
        }
    }

    /// Splits every field into two; reverse takes whichever value is set.
    struct Twin;

    impl Mangler for Twin {
        fn name(&self) -> &'static str {
            "twin"
        }

        fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
            let mut a = field.clone();
            a.name = format!("{}_a", field.name);
            let mut b = field.clone();
            b.name = format!("{}_b", field.name);
            Ok(vec![a, b])
        }

        fn unmangle(
            &self,
            _field: &FieldDescriptor,
            mut produced: Vec<FieldValue>,
        ) -> Result<Value, StageError> {
            if produced.len() != 2 {
                return Err(StageError::ValueCount {
                    expected: 2,
                    got: produced.len(),
                });
            }
            let b = produced.pop().expect("len checked");
            let a = produced.pop().expect("len checked");
            Ok(if a.value.is_nil() { b.value } else { a.value })
        }

        fn recurse(&self, _field: &FieldDescriptor) -> bool {
            false
        }
    }

    /// Drops every field; reverse restores the zero value.
    struct Erase;

    impl Mangler for Erase {
        fn name(&self) -> &'static str {
            "erase"
        }

        fn mangle(&self, _field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
            Ok(vec![])
        }

        fn unmangle(
            &self,
            field: &FieldDescriptor,
            produced: Vec<FieldValue>,
        ) -> Result<Value, StageError> {
            if !produced.is_empty() {
                return Err(StageError::ValueCount {
                    expected: 0,
                    got: produced.len(),
                });
            }
            Ok(Value::zero(&field.ty))
        }

        fn recurse(&self, _field: &FieldDescriptor) -> bool {
            false
        }
    }

    /// Rejects every field it sees.
    struct Veto;

    impl Mangler for Veto {
        fn name(&self) -> &'static str {
            "veto"
        }

        fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
            Err(StageError::UnsupportedType {
                ty: field.ty.to_string(),
            })
        }

        fn unmangle(
            &self,
            _field: &FieldDescriptor,
            _produced: Vec<FieldValue>,
        ) -> Result<Value, StageError> {
            unreachable!("veto never mangles successfully")
        }

        fn recurse(&self, _field: &FieldDescriptor) -> bool {
            false
        }
    }

    fn pair_schema() -> RecordSchema {
        RecordSchema::new(vec![
            FieldDescriptor::new("host", TypeDescriptor::optional(TypeDescriptor::Str)),
            FieldDescriptor::new("port", TypeDescriptor::optional(TypeDescriptor::Uint)),
        ])
    }

    #[test]
    fn zero_manglers_round_trip() {
        let mut tr = Translator::new(pair_schema(), vec![]);
        let shaped = tr.translate().unwrap();
        assert_eq!(shaped, Value::Record(vec![Value::Nil, Value::Nil]));

        let filled = Value::Record(vec![Value::Str("h".into()), Value::Uint(80)]);
        let back = tr.reverse(filled.clone()).unwrap();
        assert_eq!(back, filled);
    }

    #[test]
    fn rename_stage_round_trips_by_position() {
        let mut tr = Translator::new(
            pair_schema(),
            vec![Arc::new(Prefix {
                prefix: "cfg_",
                deep: false,
            })],
        );
        tr.translate().unwrap();

        let names: Vec<&str> = tr
            .reshaped()
            .unwrap()
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["cfg_host", "cfg_port"]);

        let filled = Value::Record(vec![Value::Str("h".into()), Value::Nil]);
        let back = tr.reverse(filled.clone()).unwrap();
        assert_eq!(back, filled);
    }

    #[test]
    fn splitting_stage_doubles_fields_and_recombines() {
        let mut tr = Translator::new(pair_schema(), vec![Arc::new(Twin)]);
        tr.translate().unwrap();
        assert_eq!(tr.reshaped().unwrap().len(), 4);

        // host set through its second copy, port through the first.
        let filled = Value::Record(vec![
            Value::Nil,
            Value::Str("h".into()),
            Value::Uint(80),
            Value::Nil,
        ]);
        let back = tr.reverse(filled).unwrap();
        assert_eq!(
            back,
            Value::Record(vec![Value::Str("h".into()), Value::Uint(80)])
        );
    }

    #[test]
    fn dropping_stage_restores_zero_values() {
        let mut tr = Translator::new(pair_schema(), vec![Arc::new(Erase)]);
        let shaped = tr.translate().unwrap();
        assert_eq!(shaped, Value::Record(vec![]));
        assert!(tr.reshaped().unwrap().is_empty());

        let back = tr.reverse(Value::Record(vec![])).unwrap();
        assert_eq!(back, Value::Record(vec![Value::Nil, Value::Nil]));
    }

    #[test]
    fn stages_compose_in_order() {
        let mut tr = Translator::new(
            pair_schema(),
            vec![
                Arc::new(Prefix {
                    prefix: "a_",
                    deep: false,
                }),
                Arc::new(Prefix {
                    prefix: "b_",
                    deep: false,
                }),
            ],
        );
        tr.translate().unwrap();
        assert_eq!(tr.reshaped().unwrap().fields()[0].name, "b_a_host");

        let filled = Value::Record(vec![Value::Str("h".into()), Value::Uint(1)]);
        assert_eq!(tr.reverse(filled.clone()).unwrap(), filled);
    }

    #[test]
    fn mangle_failure_carries_stage_and_field_position() {
        let mut tr = Translator::new(
            pair_schema(),
            vec![
                Arc::new(Prefix {
                    prefix: "x_",
                    deep: false,
                }),
                Arc::new(Veto),
            ],
        );
        let err = tr.translate().unwrap_err();
        match err {
            RemoldError::Mangle {
                stage,
                mangler,
                field,
                index,
                ..
            } => {
                assert_eq!(stage, 1);
                assert_eq!(mangler, "veto");
                assert_eq!(field, "x_host");
                assert_eq!(index, 0);
            }
            other => panic!("expected Mangle, got {other:?}"),
        }
    }

    #[test]
    fn unmangle_failure_carries_context() {
        struct Sour;
        impl Mangler for Sour {
            fn name(&self) -> &'static str {
                "sour"
            }
            fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
                Ok(vec![field.clone()])
            }
            fn unmangle(
                &self,
                _field: &FieldDescriptor,
                _produced: Vec<FieldValue>,
            ) -> Result<Value, StageError> {
                Err(StageError::UnsupportedType { ty: "any".into() })
            }
            fn recurse(&self, _field: &FieldDescriptor) -> bool {
                false
            }
        }

        let mut tr = Translator::new(pair_schema(), vec![Arc::new(Sour)]);
        tr.translate().unwrap();
        let err = tr
            .reverse(Value::Record(vec![Value::Nil, Value::Nil]))
            .unwrap_err();
        match err {
            RemoldError::Unmangle { stage, mangler, field, .. } => {
                assert_eq!(stage, 0);
                assert_eq!(mangler, "sour");
                assert_eq!(field, "host");
            }
            other => panic!("expected Unmangle, got {other:?}"),
        }
    }

    #[test]
    fn recursion_reshapes_nested_records_per_stage() {
        let inner = RecordSchema::new(vec![FieldDescriptor::new(
            "url",
            TypeDescriptor::optional(TypeDescriptor::Str),
        )]);
        let schema = RecordSchema::new(vec![FieldDescriptor::new(
            "db",
            TypeDescriptor::optional(TypeDescriptor::Record(inner)),
        )]);

        let mut tr = Translator::new(
            schema,
            vec![Arc::new(Prefix {
                prefix: "p_",
                deep: true,
            })],
        );
        tr.translate().unwrap();

        let reshaped = tr.reshaped().unwrap();
        assert_eq!(reshaped.fields()[0].name, "p_db");
        match &reshaped.fields()[0].ty {
            TypeDescriptor::Optional(inner) => match inner.as_ref() {
                TypeDescriptor::Record(nested) => {
                    assert_eq!(nested.fields()[0].name, "p_url");
                }
                other => panic!("expected nested record, got {other}"),
            },
            other => panic!("expected optional, got {other}"),
        }

        // Filled nested value reverses through the sub-pipeline.
        let filled = Value::Record(vec![Value::Record(vec![Value::Str("pg://".into())])]);
        let back = tr.reverse(filled).unwrap();
        assert_eq!(
            back,
            Value::Record(vec![Value::Record(vec![Value::Str("pg://".into())])])
        );

        // A nil nested pointer stays nil, without recursing.
        let back = tr.reverse(Value::Record(vec![Value::Nil])).unwrap();
        assert_eq!(back, Value::Record(vec![Value::Nil]));
    }

    #[test]
    fn recursion_handles_sequences_of_records() {
        let inner = RecordSchema::new(vec![FieldDescriptor::new(
            "name",
            TypeDescriptor::optional(TypeDescriptor::Str),
        )]);
        let schema = RecordSchema::new(vec![FieldDescriptor::new(
            "peers",
            TypeDescriptor::seq(TypeDescriptor::Record(inner)),
        )]);

        let mut tr = Translator::new(
            schema,
            vec![Arc::new(Prefix {
                prefix: "p_",
                deep: true,
            })],
        );
        tr.translate().unwrap();

        let filled = Value::Record(vec![Value::Seq(vec![
            Value::Record(vec![Value::Str("a".into())]),
            Value::Record(vec![Value::Nil]),
        ])]);
        let back = tr.reverse(filled.clone()).unwrap();
        assert_eq!(back, filled);

        // Nil sequence short-circuits.
        let back = tr.reverse(Value::Record(vec![Value::Nil])).unwrap();
        assert_eq!(back, Value::Record(vec![Value::Nil]));
    }

    #[test]
    fn private_fields_never_reach_manglers() {
        let schema = RecordSchema::new(vec![
            FieldDescriptor::new("seen", TypeDescriptor::optional(TypeDescriptor::Int)),
            FieldDescriptor::new("hidden", TypeDescriptor::Int).private(),
        ]);
        let mut tr = Translator::new(schema, vec![Arc::new(Twin)]);
        tr.translate().unwrap();

        // Only the public field was doubled.
        assert_eq!(tr.reshaped().unwrap().len(), 2);

        let back = tr
            .reverse(Value::Record(vec![Value::Int(1), Value::Nil]))
            .unwrap();
        // The private field reassembles as its zero value.
        assert_eq!(back, Value::Record(vec![Value::Int(1), Value::Int(0)]));
    }

    #[test]
    fn reverse_before_translate_is_an_error() {
        let tr = Translator::new(pair_schema(), vec![]);
        let err = tr.reverse(Value::Record(vec![])).unwrap_err();
        assert!(matches!(err, RemoldError::NotTranslated));
    }

    #[test]
    #[should_panic(expected = "remold")]
    fn arity_mismatch_is_fatal() {
        let mut tr = Translator::new(pair_schema(), vec![]);
        tr.translate().unwrap();
        let _ = tr.reverse(Value::Record(vec![Value::Nil]));
    }

    #[test]
    fn reassembly_failure_names_types() {
        // A stage that retypes the field to string and reverses to an
        // unparseable string value.
        struct Stringify;
        impl Mangler for Stringify {
            fn name(&self) -> &'static str {
                "stringify"
            }
            fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
                let mut out = field.clone();
                out.ty = TypeDescriptor::optional(TypeDescriptor::Str);
                Ok(vec![out])
            }
            fn unmangle(
                &self,
                _field: &FieldDescriptor,
                produced: Vec<FieldValue>,
            ) -> Result<Value, StageError> {
                Ok(expect_one(produced)?.value)
            }
            fn recurse(&self, _field: &FieldDescriptor) -> bool {
                false
            }
        }

        let schema = RecordSchema::new(vec![FieldDescriptor::new(
            "port",
            TypeDescriptor::optional(TypeDescriptor::Uint),
        )]);
        let mut tr = Translator::new(schema, vec![Arc::new(Stringify)]);
        tr.translate().unwrap();

        let err = tr
            .reverse(Value::Record(vec![Value::Str("not-a-port".into())]))
            .unwrap_err();
        match err {
            RemoldError::Reassembly { field, declared, .. } => {
                assert_eq!(field, "port");
                assert!(declared.contains("uint"));
            }
            other => panic!("expected Reassembly, got {other:?}"),
        }
    }

    #[test]
    fn translate_twice_resets_state() {
        let mut tr = Translator::new(pair_schema(), vec![Arc::new(Twin)]);
        tr.translate().unwrap();
        tr.translate().unwrap();
        assert_eq!(tr.reshaped().unwrap().len(), 4);

        let filled = Value::Record(vec![
            Value::Str("h".into()),
            Value::Nil,
            Value::Nil,
            Value::Uint(8080),
        ]);
        let back = tr.reverse(filled).unwrap();
        assert_eq!(
            back,
            Value::Record(vec![Value::Str("h".into()), Value::Uint(8080)])
        );
    }
}
