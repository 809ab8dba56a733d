//! Signing and verification of schema objects.
//!
//! A signed object is the canonical JSON of its map (including
//! `camliSigner`) with the closing brace swapped for a `camliSig` field:
//!
//! ```text
//! {"camliVersion":1,"camliSigner":"sha1-…","camliType":"permanode","camliSig":"<hex>"}
//! ```
//!
//! followed by a single newline. The signature covers the canonical bytes
//! exactly, so a verifier rebuilds them by cutting at the last `camliSig`.

use hoard_crypto::{Signature, SigningKey, VerifyingKey};
use hoard_store::{BlobFetcher, StoreError};
use hoard_types::BlobRef;
use tracing::debug;

use crate::canonical::to_canonical_json;
use crate::error::SchemaError;
use crate::map::SchemaMap;
use crate::schema::{PublicKeySchema, Schema, SchemaBody};

const SIG_MARKER: &str = ",\"camliSig\":\"";

/// Largest public-key blob a verifier will read.
const MAX_PUBLIC_KEY_SIZE: u64 = 16 * 1024;

/// Key type written into Ed25519 public-key blobs.
pub const KEY_TYPE_ED25519: &str = "ed25519";

/// Errors from signing or verifying schema objects.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("no signer configured")]
    NoSignerConfigured,

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("object is not signed")]
    NotSigned,

    #[error("bad signature")]
    BadSignature,

    #[error("fetching signer key: {0}")]
    Fetch(#[from] StoreError),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Produces a detached signature over a payload on behalf of `signer`.
pub trait DetachedSigner: Send + Sync {
    fn sign_detached(&self, payload: &[u8], signer: &BlobRef) -> Result<Vec<u8>, SignError>;
}

/// In-process Ed25519 signer.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// The public-key schema map for this signer.
    pub fn public_key_map(&self) -> Result<SchemaMap, SignError> {
        Ok(PublicKeySchema {
            key_type: KEY_TYPE_ED25519.into(),
            public_key: self.key.verifying_key().to_hex(),
        }
        .to_map()?)
    }

    /// Canonical bytes of the public-key blob. Its ref is the signer ref.
    pub fn public_key_blob(&self) -> Result<Vec<u8>, SignError> {
        Ok(to_canonical_json(&self.public_key_map()?)?.into_bytes())
    }
}

impl DetachedSigner for Ed25519Signer {
    fn sign_detached(&self, payload: &[u8], _signer: &BlobRef) -> Result<Vec<u8>, SignError> {
        Ok(self.key.sign(payload).to_bytes().to_vec())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("key", &self.key.verifying_key())
            .finish()
    }
}

/// Sign `map` as `signer_ref`, returning the storable signed bytes.
pub fn sign_map(
    map: &SchemaMap,
    signer_ref: Option<&BlobRef>,
    signer: &dyn DetachedSigner,
) -> Result<Vec<u8>, SignError> {
    let signer_ref = signer_ref.ok_or(SignError::NoSignerConfigured)?;
    let mut map = map.clone();
    map.insert("camliSigner", signer_ref.to_string());
    let canonical = to_canonical_json(&map)?;
    let signature = signer.sign_detached(canonical.as_bytes(), signer_ref)?;

    let head = canonical
        .strip_suffix('}')
        .ok_or_else(|| SignError::SigningFailed("canonical form is not an object".into()))?;
    Ok(format!("{head}{SIG_MARKER}{}\"}}\n", hex::encode(signature)).into_bytes())
}

/// A signed object whose signature checked out.
#[derive(Debug, Clone)]
pub struct VerifiedObject {
    pub signer: BlobRef,
    /// The signed map, without `camliSig`.
    pub map: SchemaMap,
    pub schema: Schema,
}

/// Check a signed object against its signer's public-key blob.
pub async fn verify_signed(
    bytes: &[u8],
    fetcher: &dyn BlobFetcher,
) -> Result<VerifiedObject, SignError> {
    let text = std::str::from_utf8(bytes).map_err(|_| SignError::NotSigned)?;
    let text = text.strip_suffix('\n').unwrap_or(text);
    let at = text.rfind(SIG_MARKER).ok_or(SignError::NotSigned)?;
    let sig_hex = text[at + SIG_MARKER.len()..]
        .strip_suffix("\"}")
        .ok_or(SignError::NotSigned)?;
    let payload = format!("{}}}", &text[..at]);

    let map = SchemaMap::from_slice(payload.as_bytes())?;
    let signer: BlobRef = map
        .get_str("camliSigner")
        .ok_or(SchemaError::MissingField("camliSigner"))?
        .parse()
        .map_err(SchemaError::from)?;

    let key_bytes = fetcher
        .fetch(&signer)
        .await?
        .read_limited(MAX_PUBLIC_KEY_SIZE)
        .await
        .map_err(StoreError::from)?;
    let key_schema = Schema::parse(&key_bytes)?;
    let key = key_schema
        .as_public_key()
        .ok_or_else(|| SignError::InvalidPublicKey(format!("{signer} is not a public-key blob")))?;
    if key.key_type != KEY_TYPE_ED25519 {
        return Err(SignError::InvalidPublicKey(format!(
            "unsupported key type {}",
            key.key_type
        )));
    }
    let key = VerifyingKey::from_hex(&key.public_key)
        .map_err(|e| SignError::InvalidPublicKey(e.to_string()))?;

    let sig = hex::decode(sig_hex)
        .ok()
        .and_then(|raw| Signature::from_slice(&raw).ok())
        .ok_or(SignError::BadSignature)?;
    key.verify(payload.as_bytes(), &sig)
        .map_err(|_| SignError::BadSignature)?;

    debug!(signer = %signer, "signature verified");
    let schema = Schema::from_map(map.clone())?;
    Ok(VerifiedObject {
        signer,
        map,
        schema,
    })
}
