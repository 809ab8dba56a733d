use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use hoard_gate::{ChainAuthorizer, GateConfig};
use hoard_store::BlobFetcher;
use tower_http::trace::TraceLayer;

use crate::auth::AuthProvider;
use crate::handler;

/// Shared, read-only state for every request.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn BlobFetcher>,
    pub gate: Arc<ChainAuthorizer>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// The gate fetches chain hops through the same fetcher that serves blobs.
    pub fn new(fetcher: Arc<dyn BlobFetcher>, auth: Arc<dyn AuthProvider>, gate: GateConfig) -> Self {
        let gate = Arc::new(ChainAuthorizer::new(Arc::clone(&fetcher), gate));
        Self {
            fetcher,
            gate,
            auth,
        }
    }
}

/// Build the axum router with all Hoard endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/camli/:blobref", get(handler::get_blob_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
