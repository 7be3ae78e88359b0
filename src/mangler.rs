//! The pluggable unit of reshaping.
//!
//! A [`Mangler`] maps one input field to zero-or-more output fields
//! (forward), maps the values later produced for those fields back to one
//! value of the input field (reverse), and declares whether the translator
//! should additionally apply the same mangler to the internal structure of
//! record-shaped output fields. Manglers are invoked only by
//! [`Translator`](crate::Translator), never directly.

use thiserror::Error;

use crate::case::CaseError;
use crate::schema::FieldDescriptor;
use crate::value::{ConvertError, Value};

/// A produced field paired with the value a source supplied for it; the
/// unit exchanged between stages during reverse reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub field: FieldDescriptor,
    pub value: Value,
}

/// Failure inside one stage's forward or reverse step. The translator
/// wraps it with the stage index, field index, and stage identity.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("unsupported type {ty}")]
    UnsupportedType { ty: String },

    #[error("expected {expected} produced values, got {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("both '{field}' and '{alias}' are set")]
    AliasConflict { field: String, alias: String },

    #[error("cannot construct {ty} from text: {reason}")]
    Text { ty: String, reason: String },

    #[error(transparent)]
    Case(#[from] CaseError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// A composable forward/reverse field-reshaping strategy.
///
/// The invariant every implementation must keep: the number and order of
/// fields returned by [`mangle`](Mangler::mangle) for a given input is
/// exactly the number and order of [`FieldValue`]s that
/// [`unmangle`](Mangler::unmangle) will later receive for that input.
pub trait Mangler: Send + Sync {
    /// Stage identity, used in error messages.
    fn name(&self) -> &'static str;

    /// Map one input field to its reshaped output fields.
    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError>;

    /// Rebuild one value of `field` from the values produced for the
    /// fields `mangle` emitted, in the same order, with any recursive
    /// substructure already resolved by the translator.
    fn unmangle(
        &self,
        field: &FieldDescriptor,
        produced: Vec<FieldValue>,
    ) -> Result<Value, StageError>;

    /// Whether the translator should apply this same mangler to the
    /// nested structure of this (record-shaped) output field.
    fn recurse(&self, field: &FieldDescriptor) -> bool;
}

/// Unwrap the single produced value of a pass-through stage.
pub(crate) fn expect_one(mut produced: Vec<FieldValue>) -> Result<FieldValue, StageError> {
    if produced.len() != 1 {
        return Err(StageError::ValueCount {
            expected: 1,
            got: produced.len(),
        });
    }
    Ok(produced.pop().expect("remold: length checked above"))
}
