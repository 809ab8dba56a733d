use std::io::SeekFrom;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Json, Response};
use bytes::Bytes;
use hoard_gate::FetchChain;
use hoard_store::FetchedBlob;
use hoard_types::BlobRef;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, error};

use crate::auth::Credentials;
use crate::body::guarded_body;
use crate::error::{ServerError, ServerResult};
use crate::range::{content_range, ByteRange};
use crate::router::AppState;
use crate::sniff::{sniff_content_type, OCTET_STREAM, PEEK_SIZE};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct GetParams {
    /// Comma-separated fetch chain, share first.
    pub via: Option<String>,
}

/// `GET /camli/{blobref}`.
///
/// The owner reads anything. Everyone else needs a `via` chain that the
/// gate accepts. Malformed refs are rejected before the gate runs, so they
/// are answered at once.
pub async fn get_blob_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    params: Result<Query<GetParams>, QueryRejection>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let blob = BlobRef::parse(&raw).map_err(ServerError::MalformedRef)?;
    let Query(params) = params.map_err(|e| ServerError::MalformedQuery(e.body_text()))?;

    let identity = state
        .auth
        .authenticate(&Credentials::from_headers(&headers))
        .await;
    if !identity.is_owner() {
        let via = FetchChain::parse_via(params.via.as_deref().unwrap_or_default())
            .map_err(ServerError::MalformedVia)?;
        state
            .gate
            .authorize(&via, &blob)
            .await
            .map_err(|_| ServerError::Unauthorized)?;
    }

    let range = match headers.get(header::RANGE) {
        Some(value) => Some(
            value
                .to_str()
                .ok()
                .and_then(ByteRange::parse)
                .ok_or(ServerError::InvalidRange)?,
        ),
        None => None,
    };

    let fetched = state.fetcher.fetch(&blob).await.map_err(|e| {
        if e.is_not_found() {
            ServerError::NotFound
        } else {
            error!(blob = %blob, error = %e, "fetch failed");
            ServerError::Store(e)
        }
    })?;

    match range {
        Some(range) => serve_range(blob, fetched, range).await,
        None => serve_whole(blob, fetched).await,
    }
}

async fn serve_range(blob: BlobRef, fetched: FetchedBlob, range: ByteRange) -> ServerResult<Response> {
    let FetchedBlob { mut reader, size } = fetched;
    let (skip, len) = range.resolve(size)?;
    if skip > 0 {
        reader.seek(SeekFrom::Start(skip)).await?;
    }
    debug!(blob = %blob, skip, len, size, "serving range");

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, OCTET_STREAM)
        .header(header::CONTENT_LENGTH, len)
        .header(header::CONTENT_RANGE, content_range(skip, len, size))
        .body(guarded_body(blob, reader, Bytes::new(), len))
        .map_err(|e| ServerError::Internal(e.to_string()))
}

async fn serve_whole(blob: BlobRef, fetched: FetchedBlob) -> ServerResult<Response> {
    let FetchedBlob { mut reader, size } = fetched;

    let mut head = Vec::with_capacity(PEEK_SIZE);
    (&mut reader)
        .take(PEEK_SIZE as u64)
        .read_to_end(&mut head)
        .await?;
    let content_type = sniff_content_type(&head);
    debug!(blob = %blob, size, content_type, "serving blob");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .body(guarded_body(blob, reader, Bytes::from(head), size))
        .map_err(|e| ServerError::Internal(e.to_string()))
}
