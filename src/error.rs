use thiserror::Error;

use crate::mangler::StageError;
use crate::value::ConvertError;

#[derive(Debug, Error)]
pub enum RemoldError {
    #[error("stage {stage} ({mangler}): cannot mangle field '{field}' (index {index}): {source}")]
    Mangle {
        stage: usize,
        mangler: &'static str,
        field: String,
        index: usize,
        source: StageError,
    },

    #[error("stage {stage} ({mangler}): cannot unmangle field '{field}' (index {index}): {source}")]
    Unmangle {
        stage: usize,
        mangler: &'static str,
        field: String,
        index: usize,
        source: StageError,
    },

    #[error("in nested field '{field}': {source}")]
    Nested {
        field: String,
        source: Box<RemoldError>,
    },

    #[error(
        "cannot reassemble field '{field}': produced {produced} is not convertible to declared {declared}"
    )]
    Reassembly {
        field: String,
        declared: String,
        produced: String,
    },

    #[error("cannot normalize field '{field}': {reason}")]
    Schema { field: String, reason: String },

    #[error("substitution target {to} is not convertible to {from}")]
    NotConvertible { from: String, to: String },

    #[error("reverse-translate called before translate")]
    NotTranslated,

    #[error("invalid value for '{key}': {source}")]
    InvalidValue { key: String, source: ConvertError },
}
