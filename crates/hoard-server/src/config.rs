use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use hoard_crypto::DigestRegistry;
use hoard_gate::GateConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Root directory of the on-disk blob store.
    pub blob_root: PathBuf,
    /// Bearer token that identifies the store owner. `None` means every
    /// request is anonymous and must present a fetch chain.
    pub owner_token: Option<String>,
    pub hash_scheme: String,
    pub gate: GateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3179)),
            blob_root: PathBuf::from("blobs"),
            owner_token: None,
            hash_scheme: DigestRegistry::DEFAULT_SCHEME.to_string(),
            gate: GateConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:3179".parse::<SocketAddr>().unwrap());
        assert_eq!(c.hash_scheme, "sha1");
        assert!(c.owner_token.is_none());
        assert_eq!(c.gate.failure_floor_ms, 200);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
bind_addr = "0.0.0.0:8080"
blob_root = "/var/lib/hoard"
owner_token = "s3cret"

[gate]
failure_floor_ms = 500
"#,
        )
        .unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.blob_root, PathBuf::from("/var/lib/hoard"));
        assert_eq!(c.owner_token.as_deref(), Some("s3cret"));
        assert_eq!(c.gate.failure_floor_ms, 500);
        assert_eq!(c.gate.max_share_size, 64 * 1024);
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            ServerConfig::from_toml("bind_addr = 7"),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ServerConfig::load("/nonexistent/hoard.toml"),
            Err(ServerError::Io(_))
        ));
    }
}
