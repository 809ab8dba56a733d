use std::collections::HashMap;
use std::io::Cursor;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use hoard_crypto::DigestRegistry;
use hoard_types::BlobRef;

use crate::error::{StoreError, StoreResult};
use crate::traits::{verify_incoming, BlobFetcher, BlobStore, FetchedBlob};

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock` for safe concurrent access. `Bytes` makes fetches cheap clones.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobRef, Bytes>>,
    registry: DigestRegistry,
    scheme: String,
}

impl InMemoryBlobStore {
    /// Create a new empty store naming blobs with the default scheme.
    pub fn new() -> Self {
        Self::with_scheme(DigestRegistry::standard(), DigestRegistry::DEFAULT_SCHEME)
    }

    /// Create a new empty store with an explicit registry and write scheme.
    pub fn with_scheme(registry: DigestRegistry, scheme: impl Into<String>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            registry,
            scheme: scheme.into(),
        }
    }

    /// Insert bytes under a reference without verifying them.
    ///
    /// Lets tests plant blobs under schemes the registry cannot compute.
    pub fn insert_unverified(&self, blob: BlobRef, data: impl Into<Bytes>) {
        self.blobs
            .write()
            .expect("lock poisoned")
            .insert(blob, data.into());
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// A copy of a blob's bytes, if present.
    pub fn get(&self, blob: &BlobRef) -> Option<Bytes> {
        self.blobs.read().expect("lock poisoned").get(blob).cloned()
    }

    /// Sorted list of every stored reference.
    pub fn all_refs(&self) -> Vec<BlobRef> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut refs: Vec<BlobRef> = map.keys().cloned().collect();
        refs.sort();
        refs
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobFetcher for InMemoryBlobStore {
    async fn fetch(&self, blob: &BlobRef) -> StoreResult<FetchedBlob> {
        let data = self
            .get(blob)
            .ok_or_else(|| StoreError::NotFound(blob.clone()))?;
        let size = data.len() as u64;
        Ok(FetchedBlob::new(Cursor::new(data), size))
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn registry(&self) -> &DigestRegistry {
        &self.registry
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn receive(&self, blob: &BlobRef, data: Bytes) -> StoreResult<u64> {
        verify_incoming(&self.registry, blob, &data)?;
        let size = data.len() as u64;
        let mut map = self.blobs.write().expect("lock poisoned");
        // Same reference always names the same bytes.
        map.entry(blob.clone()).or_insert(data);
        Ok(size)
    }

    async fn exists(&self, blob: &BlobRef) -> StoreResult<bool> {
        Ok(self.blobs.read().expect("lock poisoned").contains_key(blob))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("scheme", &self.scheme)
            .finish()
    }
}
