use hoard_crypto::DigestError;
use hoard_types::BlobRef;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(BlobRef),

    /// The bytes offered for a blob do not hash to its reference.
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: BlobRef, computed: BlobRef },

    /// The blob's scheme cannot be computed, so its bytes cannot be verified.
    #[error(transparent)]
    Digest(#[from] DigestError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for the not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
