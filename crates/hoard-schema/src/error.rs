use hoard_types::TypeError;

/// Errors produced while building, encoding or decoding schema objects.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema blob is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid blobref in schema: {0}")]
    BlobRef(#[from] TypeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
