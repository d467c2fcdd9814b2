//! Error type shared by the record model, the diff engine and the codec.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// The modified and original records are instances of different types.
    #[error("patch cannot be created for two different types: {modified} and {original}")]
    IncompatibleTypes { modified: String, original: String },
    #[error("unknown field `{field}` in type `{record_type}`")]
    UnknownField { record_type: String, field: String },
    #[error("value of `{field}` does not match its declared type, expected {expected}")]
    TypeMismatch { field: String, expected: String },
    #[error("unknown operation `{0}`")]
    UnknownOp(String),
    #[error("invalid operation: {0}")]
    InvalidOp(String),
    /// A staged value has no JSON representation. Aborts the whole diff.
    #[error("failed to serialize value at `{path}`: {reason}")]
    Serialization { path: String, reason: String },
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error(transparent)]
    Path(#[from] scim_filter::ParseError),
}

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        PatchError::InvalidJson(err.to_string())
    }
}
