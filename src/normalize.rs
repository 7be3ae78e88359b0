//! Schema normalization: make every field's absence distinguishable from
//! its zero value.
//!
//! Run once before building a [`Translator`](crate::Translator). Every
//! surviving field's type comes out either intrinsically nilable (map,
//! sequence, dynamic) or wrapped in one optional layer, with nested
//! records normalized recursively. Fields tagged `omit` are dropped, as
//! are channels (not configuration-representable). Opaque-text types are
//! wrapped as a unit and never decomposed — their construction contract is
//! self-contained.

use crate::error::RemoldError;
use crate::schema::{RecordSchema, TypeDescriptor};
use crate::value::Value;

/// Tag key that drops a field during normalization.
pub const OMIT: &str = "omit";

/// Produce a normalized copy of `schema`.
///
/// `template`, when given, must be a record value of `schema`; it serves
/// two purposes: dynamically-typed (`Any`) fields are specialized to the
/// concrete shape of their template value when one is present and
/// inferable, and nested templates ride along into nested records. Field
/// order is unchanged; dropped fields simply disappear.
pub fn normalize(
    schema: &RecordSchema,
    template: Option<&Value>,
) -> Result<RecordSchema, RemoldError> {
    let members = match template {
        None | Some(Value::Nil) => None,
        Some(Value::Record(members)) => {
            if members.len() != schema.len() {
                return Err(RemoldError::Schema {
                    field: "<template>".into(),
                    reason: format!(
                        "template record has {} members for {} fields",
                        members.len(),
                        schema.len()
                    ),
                });
            }
            Some(members)
        }
        Some(other) => {
            return Err(RemoldError::Schema {
                field: "<template>".into(),
                reason: format!("template is {}, expected a record", other.kind()),
            });
        }
    };

    let mut fields = Vec::with_capacity(schema.len());
    for (index, field) in schema.fields().iter().enumerate() {
        if field.tags.has(OMIT) {
            continue;
        }
        if !field.public {
            // Never filled, never reshaped; carried through untouched so
            // positional value layouts stay aligned.
            fields.push(field.clone());
            continue;
        }
        let field_template = members.and_then(|m| m.get(index));
        match normalize_type(&field.ty, field_template).map_err(|e| RemoldError::Nested {
            field: field.name.clone(),
            source: Box::new(e),
        })? {
            Some(ty) => {
                let mut normalized = field.clone();
                normalized.ty = ty;
                fields.push(normalized);
            }
            None => {} // dropped (channel)
        }
    }
    Ok(RecordSchema::new(fields))
}

/// Normalize one field type. `None` means the field is dropped.
fn normalize_type(
    ty: &TypeDescriptor,
    template: Option<&Value>,
) -> Result<Option<TypeDescriptor>, RemoldError> {
    match ty.resolved() {
        TypeDescriptor::Channel(_) => Ok(None),

        // Already able to represent absence.
        TypeDescriptor::Map(_, _) | TypeDescriptor::Seq(_) => Ok(Some(ty.clone())),

        // Devirtualize from the template value when its concrete shape is
        // inferable; otherwise there is nothing to specialize to.
        TypeDescriptor::Any => match template.and_then(|v| v.infer()) {
            Some(concrete) => normalize_type(&concrete, template),
            None => Ok(Some(ty.clone())),
        },

        // A pointer is already nilable; recurse into a pointed-to record.
        TypeDescriptor::Optional(inner) => match inner.resolved() {
            TypeDescriptor::Record(nested) => {
                let normalized = normalize_record(nested, template)?;
                Ok(Some(TypeDescriptor::optional(TypeDescriptor::Record(
                    normalized,
                ))))
            }
            _ => Ok(Some(ty.clone())),
        },

        // One optional layer, no decomposition.
        TypeDescriptor::Opaque(_) => Ok(Some(TypeDescriptor::optional(ty.clone()))),

        TypeDescriptor::Record(nested) => {
            let normalized = normalize_record(nested, template)?;
            Ok(Some(TypeDescriptor::optional(TypeDescriptor::Record(
                normalized,
            ))))
        }

        // Plain leaf: scalar, array, unit.
        _ => Ok(Some(TypeDescriptor::optional(ty.clone()))),
    }
}

fn normalize_record(
    nested: &RecordSchema,
    template: Option<&Value>,
) -> Result<RecordSchema, RemoldError> {
    if !nested.is_empty() && nested.fields().iter().all(|f| !f.public) {
        return Err(RemoldError::Schema {
            field: "<record>".into(),
            reason: "record has no public fields".into(),
        });
    }
    normalize(nested, template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, OpaqueType};

    fn field(name: &str, ty: TypeDescriptor) -> FieldDescriptor {
        FieldDescriptor::new(name, ty)
    }

    #[test]
    fn scalar_gains_one_optional_layer() {
        let schema = RecordSchema::new(vec![field("port", TypeDescriptor::Uint)]);
        let normalized = normalize(&schema, None).unwrap();
        assert_eq!(
            normalized.fields()[0].ty,
            TypeDescriptor::optional(TypeDescriptor::Uint)
        );
    }

    #[test]
    fn omit_tag_drops_field() {
        let schema = RecordSchema::new(vec![
            field("keep", TypeDescriptor::Int),
            field("gone", TypeDescriptor::Int).with_tag(OMIT, "true"),
        ]);
        let normalized = normalize(&schema, None).unwrap();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.fields()[0].name, "keep");
    }

    #[test]
    fn map_and_seq_stay_bare() {
        let schema = RecordSchema::new(vec![
            field("labels", TypeDescriptor::map(TypeDescriptor::Str, TypeDescriptor::Str)),
            field("hosts", TypeDescriptor::seq(TypeDescriptor::Str)),
        ]);
        let normalized = normalize(&schema, None).unwrap();
        assert_eq!(normalized.fields()[0].ty, schema.fields()[0].ty);
        assert_eq!(normalized.fields()[1].ty, schema.fields()[1].ty);
    }

    #[test]
    fn channel_is_dropped() {
        let schema = RecordSchema::new(vec![
            field("events", TypeDescriptor::channel(TypeDescriptor::Int)),
            field("name", TypeDescriptor::Str),
        ]);
        let normalized = normalize(&schema, None).unwrap();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.fields()[0].name, "name");
    }

    #[test]
    fn nested_record_recurses_and_wraps() {
        let inner = RecordSchema::new(vec![field("url", TypeDescriptor::Str)]);
        let schema = RecordSchema::new(vec![field("db", TypeDescriptor::Record(inner))]);
        let normalized = normalize(&schema, None).unwrap();

        let expected_inner = RecordSchema::new(vec![field(
            "url",
            TypeDescriptor::optional(TypeDescriptor::Str),
        )]);
        assert_eq!(
            normalized.fields()[0].ty,
            TypeDescriptor::optional(TypeDescriptor::Record(expected_inner))
        );
    }

    #[test]
    fn pointer_to_record_stays_single_pointer() {
        let inner = RecordSchema::new(vec![field("url", TypeDescriptor::Str)]);
        let schema = RecordSchema::new(vec![field(
            "db",
            TypeDescriptor::optional(TypeDescriptor::Record(inner)),
        )]);
        let normalized = normalize(&schema, None).unwrap();

        // Pointee normalized, but no second optional layer.
        match &normalized.fields()[0].ty {
            TypeDescriptor::Optional(inner) => match inner.as_ref() {
                TypeDescriptor::Record(nested) => {
                    assert_eq!(
                        nested.fields()[0].ty,
                        TypeDescriptor::optional(TypeDescriptor::Str)
                    );
                }
                other => panic!("expected record pointee, got {other}"),
            },
            other => panic!("expected optional, got {other}"),
        }
    }

    #[test]
    fn opaque_wraps_without_decomposing() {
        let addr = OpaqueType::new("Addr", |s| Ok(Value::Str(s.to_string())));
        let schema = RecordSchema::new(vec![field("addr", TypeDescriptor::Opaque(addr.clone()))]);
        let normalized = normalize(&schema, None).unwrap();
        assert_eq!(
            normalized.fields()[0].ty,
            TypeDescriptor::optional(TypeDescriptor::Opaque(addr))
        );
    }

    #[test]
    fn any_devirtualizes_from_template() {
        let schema = RecordSchema::new(vec![field("extra", TypeDescriptor::Any)]);
        let template = Value::Record(vec![Value::Str("hello".into())]);
        let normalized = normalize(&schema, Some(&template)).unwrap();
        assert_eq!(
            normalized.fields()[0].ty,
            TypeDescriptor::optional(TypeDescriptor::Str)
        );
    }

    #[test]
    fn any_without_template_stays_any() {
        let schema = RecordSchema::new(vec![field("extra", TypeDescriptor::Any)]);
        let normalized = normalize(&schema, None).unwrap();
        assert_eq!(normalized.fields()[0].ty, TypeDescriptor::Any);

        let nil_template = Value::Record(vec![Value::Nil]);
        let normalized = normalize(&schema, Some(&nil_template)).unwrap();
        assert_eq!(normalized.fields()[0].ty, TypeDescriptor::Any);
    }

    #[test]
    fn template_rides_into_nested_records() {
        let inner = RecordSchema::new(vec![field("extra", TypeDescriptor::Any)]);
        let schema = RecordSchema::new(vec![field("db", TypeDescriptor::Record(inner))]);
        let template = Value::Record(vec![Value::Record(vec![Value::Uint(9)])]);
        let normalized = normalize(&schema, Some(&template)).unwrap();

        match &normalized.fields()[0].ty {
            TypeDescriptor::Optional(inner) => match inner.as_ref() {
                TypeDescriptor::Record(nested) => {
                    assert_eq!(
                        nested.fields()[0].ty,
                        TypeDescriptor::optional(TypeDescriptor::Uint)
                    );
                }
                other => panic!("expected record, got {other}"),
            },
            other => panic!("expected optional, got {other}"),
        }
    }

    #[test]
    fn template_arity_mismatch_errors() {
        let schema = RecordSchema::new(vec![field("a", TypeDescriptor::Int)]);
        let template = Value::Record(vec![Value::Int(1), Value::Int(2)]);
        let err = normalize(&schema, Some(&template)).unwrap_err();
        assert!(matches!(err, RemoldError::Schema { .. }));
    }

    #[test]
    fn non_record_template_errors() {
        let schema = RecordSchema::new(vec![field("a", TypeDescriptor::Int)]);
        let err = normalize(&schema, Some(&Value::Int(1))).unwrap_err();
        assert!(err.to_string().contains("expected a record"));
    }

    #[test]
    fn private_fields_pass_through_untouched() {
        let schema = RecordSchema::new(vec![
            field("seen", TypeDescriptor::Int),
            field("hidden", TypeDescriptor::Int).private(),
        ]);
        let normalized = normalize(&schema, None).unwrap();
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized.fields()[1].ty, TypeDescriptor::Int);
    }

    #[test]
    fn all_private_nested_record_errors() {
        let inner = RecordSchema::new(vec![field("secret", TypeDescriptor::Int).private()]);
        let schema = RecordSchema::new(vec![field("db", TypeDescriptor::Record(inner))]);
        let err = normalize(&schema, None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("db"));
        assert!(msg.contains("no public fields"));
    }

    #[test]
    fn field_order_is_preserved() {
        let schema = RecordSchema::new(vec![
            field("a", TypeDescriptor::Int),
            field("b", TypeDescriptor::channel(TypeDescriptor::Int)),
            field("c", TypeDescriptor::Str),
        ]);
        let normalized = normalize(&schema, None).unwrap();
        let names: Vec<&str> = normalized.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }
}
