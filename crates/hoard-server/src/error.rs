use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use hoard_store::StoreError;
use hoard_types::TypeError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("malformed blobref: {0}")]
    MalformedRef(TypeError),

    #[error("malformed blobref in via param: {0}")]
    MalformedVia(TypeError),

    /// Query string that does not decode, e.g. a repeated `via`.
    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    /// Uniform rejection for anonymous reads; carries no reason.
    #[error("unauthorized")]
    Unauthorized,

    #[error("object not found")]
    NotFound,

    #[error("unparseable Range header")]
    InvalidRange,

    #[error("range starts at {skip} but blob has {size} bytes")]
    RangeNotSatisfiable { skip: u64, size: u64 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MalformedRef(_) | Self::MalformedQuery(_) => {
                (StatusCode::BAD_REQUEST, "Malformed GET URL.")
            }
            Self::MalformedVia(_) => (StatusCode::BAD_REQUEST, "Malformed blobref in via param"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::NotFound => (StatusCode::NOT_FOUND, "Object not found."),
            Self::InvalidRange | Self::RangeNotSatisfiable { .. } => {
                (StatusCode::RANGE_NOT_SATISFIABLE, "Requested range not satisfiable")
            }
            Self::Store(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let mut response = (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], message)
            .into_response();
        if let Self::RangeNotSatisfiable { size, .. } = self {
            if let Ok(value) = format!("bytes */{size}").parse() {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}
