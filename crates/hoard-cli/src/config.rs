use std::path::{Path, PathBuf};

use anyhow::Context;
use hoard_types::BlobRef;
use serde::{Deserialize, Serialize};

/// Client-side settings, stored as TOML (`hoard.toml` by default).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Local blob directory uploads are written to.
    pub blob_root: PathBuf,
    pub hash_scheme: String,
    /// Hex-encoded Ed25519 secret written by `hoard init`.
    pub secret_key_path: PathBuf,
    /// Ref of the public-key blob; set by `hoard init`.
    pub public_key: Option<BlobRef>,
    pub parallelism: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            blob_root: PathBuf::from("blobs"),
            hash_scheme: "sha1".into(),
            secret_key_path: PathBuf::from("hoard.key"),
            public_key: None,
            parallelism: 4,
        }
    }
}

impl ClientConfig {
    /// Read the config at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }
}
