//! Schema objects for the Hoard blob store.
//!
//! A schema object is a JSON object blob carrying a `camliType`
//! discriminator. This crate builds them ([`builder`]), encodes them to the
//! single canonical byte form that is hashed and signed ([`canonical`]),
//! decodes them into a typed [`Schema`] variant, and signs/verifies them
//! ([`sign`]).
//!
//! Signed objects (permanodes and shares) are the canonical JSON with the
//! closing brace replaced by a `camliSig` field, so the signature covers
//! exactly the canonical bytes.

pub mod builder;
pub mod canonical;
pub mod error;
pub mod map;
pub mod schema;
pub mod sign;

pub use builder::{
    new_directory, new_file, new_permanode, new_share, new_symlink, new_unique_permanode,
    StaticSet, AUTH_HAVEREF,
};
pub use canonical::to_canonical_json;
pub use error::{SchemaError, SchemaResult};
pub use map::{SchemaMap, CAMLI_VERSION};
pub use schema::{
    ContentPart, DirectorySchema, FileCommon, FileSchema, PermanodeSchema, PublicKeySchema,
    Schema, ShareSchema, StaticSetSchema, SymlinkSchema,
};
pub use sign::{sign_map, verify_signed, DetachedSigner, Ed25519Signer, SignError, VerifiedObject};
