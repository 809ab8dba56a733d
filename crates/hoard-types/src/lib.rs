//! Foundation types for the Hoard blob store.
//!
//! Every blob in Hoard is named by a [`BlobRef`]: the name of a hash scheme
//! and the lowercase hex digest of the blob's bytes under that scheme,
//! written `scheme-digest` (for example `sha1-f1d2d2f924e986ac86fdf7b36c94bcdf32beec15`).
//! That string form is the only external representation and is used in URLs,
//! JSON fields and via-chain parameters alike.
//!
//! This crate is pure: it parses and validates references but never hashes.
//! Hash functions live in `hoard-crypto`.

pub mod blobref;
pub mod error;

pub use blobref::{expected_digest_len, BlobRef, KNOWN_DIGEST_LENGTHS};
pub use error::TypeError;
