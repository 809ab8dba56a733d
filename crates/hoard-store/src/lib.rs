//! Content-addressed blob storage for Hoard.
//!
//! Blobs are immutable byte sequences keyed by their [`BlobRef`]. Everything
//! above this crate (the chain authorizer, the retrieval service, the
//! uploader) talks to storage only through two traits:
//!
//! - [`BlobFetcher`] -- `fetch(ref) -> (reader, size) | NotFound | Io`
//! - [`BlobStore`] -- a fetcher that can also accept new blobs
//!
//! # Backends
//!
//! - [`InMemoryBlobStore`] -- map-backed store for tests and embedding
//! - [`DiskBlobStore`] -- one file per blob under a root directory
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written; a second write of the same bytes is a no-op.
//! 2. Bytes are verified against their reference before they are linked in.
//! 3. Concurrent fetches are always safe.
//! 4. The store never interprets blob contents.
//!
//! [`BlobRef`]: hoard_types::BlobRef

pub mod disk;
pub mod error;
pub mod memory;
pub mod traits;

pub use disk::DiskBlobStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlobStore;
pub use traits::{BlobFetcher, BlobReader, BlobStore, FetchedBlob};
