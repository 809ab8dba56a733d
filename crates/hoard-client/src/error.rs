use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The path is a device, socket, FIFO or other unsupported kind.
    #[error("unsupported file type at {0}")]
    Unimplemented(PathBuf),

    #[error("store error: {0}")]
    Store(#[from] hoard_store::StoreError),

    #[error("schema error: {0}")]
    Schema(#[from] hoard_schema::SchemaError),

    #[error("signing error: {0}")]
    Sign(#[from] hoard_schema::SignError),

    #[error(transparent)]
    Digest(#[from] hoard_crypto::DigestError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
