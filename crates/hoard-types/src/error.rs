use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid blobref {input:?}: {reason}")]
    InvalidBlobRef { input: String, reason: String },

    #[error("invalid digest length for {scheme}: expected {expected}, got {actual}")]
    InvalidLength {
        scheme: String,
        expected: usize,
        actual: usize,
    },
}

impl TypeError {
    pub(crate) fn invalid(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBlobRef {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
