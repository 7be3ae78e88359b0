//! Canonical/alias field splitting.
//!
//! A field carrying alias metadata (say `flag-alias = "t"` next to
//! `flag = "timeout"`) splits into the original field (alias keys
//! stripped) and a synthetic duplicate whose canonical keys carry the
//! alias values, so a source can accept either spelling. The reverse pass
//! takes whichever of the two was set and rejects the case where both
//! were.

use crate::mangler::{FieldValue, Mangler, StageError, expect_one};
use crate::schema::FieldDescriptor;
use crate::value::Value;

/// Tag key the alias note is appended to.
const USAGE: &str = "usage";

pub struct AliasMangler {
    /// `(canonical key, alias key)` pairs to look for in field tags.
    pairs: Vec<(String, String)>,
}

impl AliasMangler {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        AliasMangler {
            pairs: pairs
                .into_iter()
                .map(|(canonical, alias)| (canonical.to_string(), alias.to_string()))
                .collect(),
        }
    }
}

impl Mangler for AliasMangler {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        // (canonical key, alias value, display name of what it aliases)
        let hits: Vec<(String, String, String)> = self
            .pairs
            .iter()
            .filter_map(|(canonical, alias)| {
                field.tags.get(alias).map(|alias_value| {
                    let display = field
                        .tags
                        .get(canonical)
                        .unwrap_or(&field.name)
                        .to_string();
                    (canonical.clone(), alias_value.to_string(), display)
                })
            })
            .collect();

        if hits.is_empty() {
            return Ok(vec![field.clone()]);
        }

        let mut original = field.clone();
        for (_, alias) in &self.pairs {
            original.tags.remove(alias);
        }

        let mut duplicate = original.clone();
        duplicate.name = format!("{}_alias", field.name);
        for (canonical, alias_value, _) in &hits {
            duplicate.tags.set(canonical, alias_value);
        }

        let aliased: Vec<&str> = hits.iter().map(|(_, _, display)| display.as_str()).collect();
        let note = format!("alias for {}", aliased.join(", "));
        let usage = match duplicate.tags.get(USAGE) {
            Some(existing) if !existing.is_empty() => format!("{existing} ({note})"),
            _ => note,
        };
        duplicate.tags.set(USAGE, &usage);

        Ok(vec![original, duplicate])
    }

    fn unmangle(
        &self,
        _field: &FieldDescriptor,
        mut produced: Vec<FieldValue>,
    ) -> Result<Value, StageError> {
        match produced.len() {
            1 => Ok(expect_one(produced)?.value),
            2 => {
                let alias = produced.pop().expect("remold: length checked above");
                let canonical = produced.pop().expect("remold: length checked above");
                match (canonical.value.is_nil(), alias.value.is_nil()) {
                    (false, false) => Err(StageError::AliasConflict {
                        field: canonical.field.name,
                        alias: alias.field.name,
                    }),
                    (false, true) => Ok(canonical.value),
                    (true, _) => Ok(alias.value),
                }
            }
            got => Err(StageError::ValueCount { expected: 2, got }),
        }
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeDescriptor;

    fn mangler() -> AliasMangler {
        AliasMangler::new([("flag", "flag-alias")])
    }

    fn timeout_field() -> FieldDescriptor {
        FieldDescriptor::new("timeout", TypeDescriptor::optional(TypeDescriptor::Int))
            .with_tag("flag", "timeout")
            .with_tag("flag-alias", "t")
    }

    #[test]
    fn field_without_alias_passes_through() {
        let field = FieldDescriptor::new("host", TypeDescriptor::Str).with_tag("flag", "host");
        let out = mangler().mangle(&field).unwrap();
        assert_eq!(out, vec![field]);
    }

    #[test]
    fn alias_splits_into_two_fields() {
        let out = mangler().mangle(&timeout_field()).unwrap();
        assert_eq!(out.len(), 2);

        // Original: alias key stripped, canonical untouched.
        assert_eq!(out[0].name, "timeout");
        assert_eq!(out[0].tags.get("flag"), Some("timeout"));
        assert!(out[0].tags.get("flag-alias").is_none());

        // Duplicate: alias value under the canonical key, note appended.
        assert_eq!(out[1].name, "timeout_alias");
        assert_eq!(out[1].tags.get("flag"), Some("t"));
        assert_eq!(out[1].tags.get("usage"), Some("alias for timeout"));
    }

    #[test]
    fn note_appends_to_existing_usage() {
        let field = timeout_field().with_tag("usage", "request timeout");
        let out = mangler().mangle(&field).unwrap();
        assert_eq!(
            out[1].tags.get("usage"),
            Some("request timeout (alias for timeout)")
        );
    }

    #[test]
    fn multiple_alias_pairs_apply_together() {
        let m = AliasMangler::new([("flag", "flag-alias"), ("env", "env-alias")]);
        let field = timeout_field().with_tag("env", "TIMEOUT").with_tag("env-alias", "T");
        let out = m.mangle(&field).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].tags.get("flag"), Some("t"));
        assert_eq!(out[1].tags.get("env"), Some("T"));
        assert!(out[0].tags.get("env-alias").is_none());
    }

    #[test]
    fn reverse_single_value_passes_through() {
        let field = FieldDescriptor::new("host", TypeDescriptor::Str);
        let produced = vec![FieldValue {
            field: field.clone(),
            value: Value::Str("x".into()),
        }];
        assert_eq!(
            mangler().unmangle(&field, produced).unwrap(),
            Value::Str("x".into())
        );
    }

    fn split_tuples(canonical: Value, alias: Value) -> (FieldDescriptor, Vec<FieldValue>) {
        let field = timeout_field();
        let out = mangler().mangle(&field).unwrap();
        let produced = vec![
            FieldValue {
                field: out[0].clone(),
                value: canonical,
            },
            FieldValue {
                field: out[1].clone(),
                value: alias,
            },
        ];
        (field, produced)
    }

    #[test]
    fn reverse_prefers_whichever_is_set() {
        let (field, produced) = split_tuples(Value::Int(30), Value::Nil);
        assert_eq!(mangler().unmangle(&field, produced).unwrap(), Value::Int(30));

        let (field, produced) = split_tuples(Value::Nil, Value::Int(5));
        assert_eq!(mangler().unmangle(&field, produced).unwrap(), Value::Int(5));
    }

    #[test]
    fn reverse_both_absent_is_absent() {
        let (field, produced) = split_tuples(Value::Nil, Value::Nil);
        assert_eq!(mangler().unmangle(&field, produced).unwrap(), Value::Nil);
    }

    #[test]
    fn reverse_both_set_is_a_conflict() {
        let (field, produced) = split_tuples(Value::Int(30), Value::Int(5));
        let err = mangler().unmangle(&field, produced).unwrap_err();
        match err {
            StageError::AliasConflict { field, alias } => {
                assert_eq!(field, "timeout");
                assert_eq!(alias, "timeout_alias");
            }
            other => panic!("expected AliasConflict, got {other:?}"),
        }
    }

    #[test]
    fn conflict_surfaces_through_translator() {
        use crate::Translator;
        use crate::error::RemoldError;
        use std::sync::Arc;

        let schema = crate::schema::RecordSchema::new(vec![timeout_field()]);
        let mut tr = Translator::new(schema, vec![Arc::new(mangler())]);
        tr.translate().unwrap();
        assert_eq!(tr.reshaped().unwrap().len(), 2);

        let err = tr
            .reverse(Value::Record(vec![Value::Int(30), Value::Int(5)]))
            .unwrap_err();
        assert!(matches!(err, RemoldError::Unmangle { .. }));
        assert!(err.to_string().contains("both"));

        let back = tr
            .reverse(Value::Record(vec![Value::Nil, Value::Int(5)]))
            .unwrap();
        assert_eq!(back, Value::Record(vec![Value::Int(5)]));
    }
}
