//! HTTP blob retrieval for Hoard.
//!
//! Serves `GET /camli/{blobref}`. The owner (bearer token) reads any blob;
//! anonymous callers must present a `via` fetch chain that the
//! [`hoard_gate::ChainAuthorizer`] accepts. Responses honor single
//! `Range: bytes=A-B` requests, guess a content type for whole blobs, and
//! abort the connection rather than finish a body that came up short.

pub mod auth;
pub mod body;
pub mod config;
pub mod error;
pub mod handler;
pub mod range;
pub mod router;
pub mod server;
pub mod sniff;

pub use auth::{AuthProvider, Credentials, Identity, OwnerTokenAuth};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use range::ByteRange;
pub use router::{build_router, AppState};
pub use server::HoardServer;
