use std::sync::Arc;

use hoard_crypto::DigestRegistry;
use hoard_store::{BlobFetcher, DiskBlobStore};
use tokio::net::TcpListener;

use crate::auth::OwnerTokenAuth;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Hoard blob server.
pub struct HoardServer {
    config: ServerConfig,
    fetcher: Arc<dyn BlobFetcher>,
}

impl HoardServer {
    /// Serve the on-disk store at `config.blob_root`.
    pub fn new(config: ServerConfig) -> Self {
        let store = DiskBlobStore::with_scheme(
            config.blob_root.clone(),
            DigestRegistry::standard(),
            config.hash_scheme.clone(),
        );
        Self::with_fetcher(config, Arc::new(store))
    }

    /// Serve an arbitrary fetcher (useful for embedding and tests).
    pub fn with_fetcher(config: ServerConfig, fetcher: Arc<dyn BlobFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn router(&self) -> axum::Router {
        let auth = Arc::new(OwnerTokenAuth::new(self.config.owner_token.clone()));
        build_router(AppState::new(
            Arc::clone(&self.fetcher),
            auth,
            self.config.gate.clone(),
        ))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            owner_auth = self.config.owner_token.is_some(),
            "Hoard server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = HoardServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr.port(), 3179);
    }

    #[test]
    fn router_builds() {
        let server = HoardServer::new(ServerConfig::default());
        let _router = server.router();
    }
}
