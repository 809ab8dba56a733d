use async_trait::async_trait;
use bytes::Bytes;
use hoard_crypto::DigestRegistry;
use hoard_types::BlobRef;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek};

use crate::error::StoreResult;

/// A readable, seekable blob byte stream.
pub trait BlobReader: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> BlobReader for T {}

/// An opened blob: its byte stream plus its total size.
///
/// The stream is released when this value is dropped, so every exit path of
/// the caller (success, error, early return, cancelled task) closes it.
pub struct FetchedBlob {
    pub reader: Box<dyn BlobReader>,
    pub size: u64,
}

impl FetchedBlob {
    pub fn new(reader: impl BlobReader + 'static, size: u64) -> Self {
        Self {
            reader: Box::new(reader),
            size,
        }
    }

    /// Read at most `limit` bytes from the current position.
    pub async fn read_limited(mut self, limit: u64) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size.min(limit) as usize);
        (&mut self.reader).take(limit).read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

impl std::fmt::Debug for FetchedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedBlob")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Read side of a blob store.
///
/// Implementations must be safe for concurrent use by many requests at once.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    /// Open a blob for reading.
    ///
    /// Returns `StoreError::NotFound` if the blob does not exist, and
    /// `StoreError::Io` on backend failure.
    async fn fetch(&self, blob: &BlobRef) -> StoreResult<FetchedBlob>;
}

/// Write side of a content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written. Receiving bytes that are already
///   stored is a no-op.
/// - Bytes are verified against the reference before they become visible.
#[async_trait]
pub trait BlobStore: BlobFetcher {
    /// Hash functions this store can verify with.
    fn registry(&self) -> &DigestRegistry;

    /// Scheme used by [`BlobStore::put`] to name new blobs.
    fn scheme(&self) -> &str;

    /// Store `data` under `blob` after checking that it hashes to it.
    ///
    /// Returns the number of bytes stored.
    async fn receive(&self, blob: &BlobRef, data: Bytes) -> StoreResult<u64>;

    /// Check whether a blob is present.
    async fn exists(&self, blob: &BlobRef) -> StoreResult<bool>;

    /// Hash `data` with the store's scheme and store it.
    async fn put(&self, data: Bytes) -> StoreResult<BlobRef> {
        let blob = self.registry().digest_bytes(self.scheme(), &data)?;
        self.receive(&blob, data).await?;
        Ok(blob)
    }
}

/// Shared verification step for [`BlobStore::receive`] implementations.
pub(crate) fn verify_incoming(
    registry: &DigestRegistry,
    blob: &BlobRef,
    data: &[u8],
) -> StoreResult<()> {
    let computed = registry.digest_bytes(blob.scheme(), data)?;
    if computed != *blob {
        return Err(crate::error::StoreError::HashMismatch {
            expected: blob.clone(),
            computed,
        });
    }
    Ok(())
}
