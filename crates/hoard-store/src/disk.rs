use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use hoard_crypto::DigestRegistry;
use hoard_types::BlobRef;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{verify_incoming, BlobFetcher, BlobStore, FetchedBlob};

/// Filesystem blob store: one file per blob.
///
/// Layout: `root/<scheme>/<d0d1>/<d2d3>/<scheme>-<digest>.dat`, where `dN`
/// are the leading digest characters. Writes land in a temp file inside the
/// target directory and are renamed into place, so a reader never observes a
/// partially written blob.
#[derive(Debug)]
pub struct DiskBlobStore {
    root: PathBuf,
    registry: DigestRegistry,
    scheme: String,
}

impl DiskBlobStore {
    /// Open (or lazily create) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_scheme(root, DigestRegistry::standard(), DigestRegistry::DEFAULT_SCHEME)
    }

    pub fn with_scheme(
        root: impl Into<PathBuf>,
        registry: DigestRegistry,
        scheme: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            registry,
            scheme: scheme.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `blob` lives (or would live) on disk.
    pub fn blob_path(&self, blob: &BlobRef) -> PathBuf {
        let digest = blob.digest();
        let (a, b) = if digest.len() >= 4 {
            (&digest[0..2], &digest[2..4])
        } else {
            ("00", "00")
        };
        self.root
            .join(blob.scheme())
            .join(a)
            .join(b)
            .join(format!("{blob}.dat"))
    }
}

#[async_trait]
impl BlobFetcher for DiskBlobStore {
    async fn fetch(&self, blob: &BlobRef) -> StoreResult<FetchedBlob> {
        let path = self.blob_path(blob);
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(blob.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata().await?.len();
        Ok(FetchedBlob::new(file, size))
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    fn registry(&self) -> &DigestRegistry {
        &self.registry
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn receive(&self, blob: &BlobRef, data: Bytes) -> StoreResult<u64> {
        verify_incoming(&self.registry, blob, &data)?;
        let size = data.len() as u64;
        let path = self.blob_path(blob);
        if tokio::fs::try_exists(&path).await? {
            debug!(blob = %blob, "blob already stored");
            return Ok(size);
        }

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        tokio::fs::create_dir_all(&dir).await?;

        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&data)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        debug!(blob = %blob, size, "stored blob");
        Ok(size)
    }

    async fn exists(&self, blob: &BlobRef) -> StoreResult<bool> {
        Ok(tokio::fs::try_exists(self.blob_path(blob)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncSeekExt};

    #[tokio::test]
    async fn put_fetch_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path());
        let blob = store.put(Bytes::from_static(b"on disk")).await.unwrap();

        let mut fetched = store.fetch(&blob).await.unwrap();
        assert_eq!(fetched.size, 7);
        let mut out = String::new();
        fetched.reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "on disk");
    }

    #[tokio::test]
    async fn layout_is_sharded_by_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path());
        let blob = store.put(Bytes::from_static(b"hello")).await.unwrap();
        let expected = dir
            .path()
            .join("sha1")
            .join("aa")
            .join("f4")
            .join("sha1-aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d.dat");
        assert_eq!(store.blob_path(&blob), expected);
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn second_write_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path());
        let a = store.put(Bytes::from_static(b"twice")).await.unwrap();
        let b = store.put(Bytes::from_static(b"twice")).await.unwrap();
        assert_eq!(a, b);
        assert!(store.exists(&a).await.unwrap());
    }

    #[tokio::test]
    async fn missing_blob_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path());
        let blob = store.registry().digest_bytes("sha1", b"nope").unwrap();
        assert!(store.fetch(&blob).await.unwrap_err().is_not_found());
        assert!(!store.exists(&blob).await.unwrap());
    }

    #[tokio::test]
    async fn mismatched_bytes_are_never_linked() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path());
        let blob = store.registry().digest_bytes("sha1", b"real").unwrap();
        assert!(store
            .receive(&blob, Bytes::from_static(b"fake"))
            .await
            .is_err());
        assert!(!store.blob_path(&blob).exists());
    }

    #[tokio::test]
    async fn fetched_reader_is_seekable() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path());
        let blob = store.put(Bytes::from_static(b"0123456789")).await.unwrap();
        let mut fetched = store.fetch(&blob).await.unwrap();
        fetched
            .reader
            .seek(std::io::SeekFrom::Start(6))
            .await
            .unwrap();
        let mut rest = String::new();
        fetched.reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "6789");
    }
}
