//! Cryptographic primitives for the Hoard blob store.
//!
//! Provides the hash-scheme registry that turns bytes into [`BlobRef`]s and
//! the Ed25519 key types used to sign schema objects.
//!
//! Everything here wraps established libraries; there is no custom cryptography.
//!
//! [`BlobRef`]: hoard_types::BlobRef

pub mod digest;
pub mod signer;

pub use digest::{DigestError, DigestRegistry, HashState, StreamHasher};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
