use std::fs::Metadata;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use hoard_schema::{
    new_directory, new_file, new_share, new_symlink, new_unique_permanode, to_canonical_json,
    ContentPart, DetachedSigner, FileCommon, SchemaMap, StaticSet,
};
use hoard_store::BlobStore;
use hoard_types::BlobRef;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Directory entries uploaded at once. Zero is treated as one.
    pub parallelism: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// A stored blob and its size in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutResult {
    pub blob: BlobRef,
    pub size: u64,
}

struct SignerHandle {
    blob: BlobRef,
    signer: Arc<dyn DetachedSigner>,
}

/// Uploads filesystem trees and signed objects into a blob store.
///
/// Every stored object is content-addressed, so uploading the same bytes
/// twice yields the same ref and the store keeps one copy.
pub struct Uploader {
    store: Arc<dyn BlobStore>,
    config: UploadConfig,
    signer: Option<SignerHandle>,
}

impl Uploader {
    pub fn new(store: Arc<dyn BlobStore>, config: UploadConfig) -> Self {
        Self {
            store,
            config,
            signer: None,
        }
    }

    /// Sign permanodes and shares as `signer_ref`, the ref of the
    /// signer's public-key blob.
    pub fn with_signer(mut self, signer_ref: BlobRef, signer: Arc<dyn DetachedSigner>) -> Self {
        self.signer = Some(SignerHandle {
            blob: signer_ref,
            signer,
        });
        self
    }

    pub fn signer_ref(&self) -> Option<&BlobRef> {
        self.signer.as_ref().map(|s| &s.blob)
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub async fn upload_bytes(&self, data: Bytes) -> ClientResult<PutResult> {
        let size = data.len() as u64;
        let blob = self.store.put(data).await?;
        debug!(blob = %blob, size, "uploaded blob");
        Ok(PutResult { blob, size })
    }

    /// Store a file's raw bytes as one blob, with no schema object.
    pub async fn upload_blob_file(&self, path: &Path) -> ClientResult<PutResult> {
        let (blob, data) = self.read_and_hash(path).await?;
        let size = self.store.receive(&blob, data).await?;
        debug!(blob = %blob, size, path = %path.display(), "uploaded raw file");
        Ok(PutResult { blob, size })
    }

    /// Canonicalize and store a schema map.
    pub async fn upload_map(&self, map: &SchemaMap) -> ClientResult<PutResult> {
        let json = to_canonical_json(map)?;
        self.upload_bytes(Bytes::from(json)).await
    }

    /// Sign a schema map with the configured signer.
    pub fn sign_map(&self, map: &SchemaMap) -> ClientResult<Vec<u8>> {
        let handle = self
            .signer
            .as_ref()
            .ok_or(hoard_schema::SignError::NoSignerConfigured)?;
        Ok(hoard_schema::sign_map(
            map,
            Some(&handle.blob),
            handle.signer.as_ref(),
        )?)
    }

    /// Create, sign and store a fresh permanode.
    pub async fn upload_permanode(&self) -> ClientResult<PutResult> {
        let map = new_unique_permanode(&mut rand::thread_rng());
        let signed = self.sign_map(&map)?;
        self.upload_bytes(Bytes::from(signed)).await
    }

    /// Create, sign and store a share granting read access to `target`.
    pub async fn upload_share(&self, target: &BlobRef, transitive: bool) -> ClientResult<PutResult> {
        let signed = self.sign_map(&new_share(target, transitive))?;
        self.upload_bytes(Bytes::from(signed)).await
    }

    /// Upload a file, symlink or directory tree and return the ref of its
    /// schema object.
    pub fn upload_path<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, ClientResult<PutResult>> {
        async move {
            let meta = tokio::fs::symlink_metadata(path).await?;
            let kind = meta.file_type();
            if kind.is_file() {
                self.upload_regular(path, &meta).await
            } else if kind.is_symlink() {
                self.upload_symlink(path, &meta).await
            } else if kind.is_dir() {
                self.upload_directory(path, &meta).await
            } else {
                Err(ClientError::Unimplemented(path.to_path_buf()))
            }
        }
        .boxed()
    }

    async fn upload_regular(&self, path: &Path, meta: &Metadata) -> ClientResult<PutResult> {
        let (blob, data) = self.read_and_hash(path).await?;
        let size = data.len() as u64;
        if size != meta.len() {
            // The file changed between stat and read; the read is what got hashed.
            warn!(path = %path.display(), stat = meta.len(), read = size, "file size changed during upload");
        }
        self.store.receive(&blob, data).await?;

        let parts = vec![ContentPart {
            blob_ref: blob,
            size,
        }];
        let map = new_file(&file_common(path, meta), size, parts)?;
        let put = self.upload_map(&map).await?;
        debug!(path = %path.display(), blob = %put.blob, "uploaded file");
        Ok(put)
    }

    async fn upload_symlink(&self, path: &Path, meta: &Metadata) -> ClientResult<PutResult> {
        let target = tokio::fs::read_link(path).await?;
        let map = new_symlink(&file_common(path, meta), target.to_string_lossy())?;
        self.upload_map(&map).await
    }

    async fn upload_directory(&self, path: &Path, meta: &Metadata) -> ClientResult<PutResult> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        names.sort();
        let children: Vec<PathBuf> = names.into_iter().map(|name| path.join(name)).collect();

        // `buffered` yields results in input order, so members stay sorted.
        let uploads: Vec<BoxFuture<'_, ClientResult<PutResult>>> =
            children.iter().map(|child| self.upload_path(child)).collect();
        let results: Vec<ClientResult<PutResult>> = stream::iter(uploads)
            .buffered(self.config.parallelism.max(1))
            .collect()
            .await;

        let mut set = StaticSet::new();
        for result in results {
            set.add(result?.blob);
        }
        let entries = self.upload_map(&set.to_map()?).await?;
        let map = new_directory(&file_common(path, meta), &entries.blob)?;
        let put = self.upload_map(&map).await?;
        debug!(path = %path.display(), entries = set.len(), blob = %put.blob, "uploaded directory");
        Ok(put)
    }

    /// Read a whole file and hash it with the store's scheme.
    async fn read_and_hash(&self, path: &Path) -> ClientResult<(BlobRef, Bytes)> {
        let registry = self.store.registry().clone();
        let scheme = self.store.scheme().to_string();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> ClientResult<(BlobRef, Bytes)> {
            let data = std::fs::read(&path)?;
            let (blob, _) = registry.digest_reader(&scheme, &mut Cursor::new(&data))?;
            Ok((blob, Bytes::from(data)))
        })
        .await
        .map_err(|e| ClientError::Internal(e.to_string()))?
    }
}

/// Name, permission, ownership and mtime fields for a path.
fn file_common(path: &Path, meta: &Metadata) -> FileCommon {
    let mut common = FileCommon {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        unix_mtime: meta
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        ..Default::default()
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        common.unix_permission = Some(format!("{:04o}", meta.mode() & 0o7777));
        common.unix_owner_id = Some(meta.uid());
        common.unix_group_id = Some(meta.gid());
    }

    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoard_crypto::SigningKey;
    use hoard_schema::{verify_signed, Ed25519Signer, Schema};
    use hoard_store::InMemoryBlobStore;

    fn uploader(store: &Arc<InMemoryBlobStore>) -> Uploader {
        Uploader::new(store.clone(), UploadConfig::default())
    }

    fn schema_at(store: &InMemoryBlobStore, blob: &BlobRef) -> Schema {
        Schema::parse(&store.get(blob).expect("stored")).unwrap()
    }

    async fn signing_uploader(store: &Arc<InMemoryBlobStore>) -> Uploader {
        let signer = Ed25519Signer::new(SigningKey::from_bytes([5u8; 32]));
        let key_ref = store
            .put(Bytes::from(signer.public_key_blob().unwrap()))
            .await
            .unwrap();
        uploader(store).with_signer(key_ref, Arc::new(signer))
    }

    #[tokio::test]
    async fn same_file_content_same_ref() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"same bytes").unwrap();

        let store = Arc::new(InMemoryBlobStore::new());
        let up = uploader(&store);
        let first = up.upload_blob_file(&path).await.unwrap();
        let second = up.upload_blob_file(&path).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.size, 10);

        let a = up.upload_path(&path).await.unwrap();
        let b = up.upload_path(&path).await.unwrap();
        assert_eq!(a.blob, b.blob);
    }

    #[tokio::test]
    async fn file_schema_points_at_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let store = Arc::new(InMemoryBlobStore::new());
        let put = uploader(&store).upload_path(&path).await.unwrap();

        let schema = schema_at(&store, &put.blob);
        let file = schema.as_file().expect("file schema");
        assert_eq!(file.common.file_name.as_deref(), Some("notes.txt"));
        assert_eq!(file.size, 5);
        assert_eq!(file.content_parts.len(), 1);
        assert_eq!(
            store.get(&file.content_parts[0].blob_ref).unwrap(),
            Bytes::from_static(b"hello")
        );
        assert!(file.common.unix_mtime.is_some());
    }

    #[tokio::test]
    async fn directory_members_are_name_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"bee").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"ay").unwrap();

        let store = Arc::new(InMemoryBlobStore::new());
        let up = uploader(&store);
        let first = up.upload_path(dir.path()).await.unwrap();
        let again = up.upload_path(dir.path()).await.unwrap();
        assert_eq!(first.blob, again.blob);

        let schema = schema_at(&store, &first.blob);
        let entries = &schema.as_directory().expect("directory").entries;
        let set = schema_at(&store, entries);
        let names: Vec<String> = set
            .as_static_set()
            .expect("static set")
            .members
            .iter()
            .map(|m| {
                schema_at(&store, m)
                    .as_file()
                    .and_then(|f| f.common.file_name.clone())
                    .unwrap()
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn nested_directories_and_serial_upload_agree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("x"), b"x").unwrap();
        std::fs::write(dir.path().join("top"), b"t").unwrap();

        let store = Arc::new(InMemoryBlobStore::new());
        let parallel = uploader(&store).upload_path(dir.path()).await.unwrap();
        let serial = Uploader::new(store.clone(), UploadConfig { parallelism: 0 })
            .upload_path(dir.path())
            .await
            .unwrap();
        assert_eq!(parallel.blob, serial.blob);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_records_target() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("../elsewhere", &link).unwrap();

        let store = Arc::new(InMemoryBlobStore::new());
        let put = uploader(&store).upload_path(&link).await.unwrap();
        match schema_at(&store, &put.blob) {
            Schema::Symlink(s) => assert_eq!(s.symlink_target, "../elsewhere"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn socket_is_unimplemented() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("sock");
        let _listener = std::os::unix::net::UnixListener::bind(&sock).unwrap();

        let store = Arc::new(InMemoryBlobStore::new());
        let err = uploader(&store).upload_path(&sock).await.unwrap_err();
        assert!(matches!(err, ClientError::Unimplemented(_)));
    }

    #[tokio::test]
    async fn signed_objects_need_a_signer() {
        let store = Arc::new(InMemoryBlobStore::new());
        let err = uploader(&store).upload_permanode().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Sign(hoard_schema::SignError::NoSignerConfigured)
        ));
    }

    #[tokio::test]
    async fn permanodes_are_unique_and_verify() {
        let store = Arc::new(InMemoryBlobStore::new());
        let up = signing_uploader(&store).await;
        let a = up.upload_permanode().await.unwrap();
        let b = up.upload_permanode().await.unwrap();
        assert_ne!(a.blob, b.blob);

        let bytes = store.get(&a.blob).unwrap();
        let verified = verify_signed(&bytes, store.as_ref()).await.unwrap();
        assert_eq!(Some(&verified.signer), up.signer_ref());
        assert!(matches!(verified.schema, Schema::Permanode(_)));
    }

    #[tokio::test]
    async fn share_targets_blob() {
        let store = Arc::new(InMemoryBlobStore::new());
        let up = signing_uploader(&store).await;
        let target = up.upload_bytes(Bytes::from_static(b"shared")).await.unwrap();
        let share = up.upload_share(&target.blob, true).await.unwrap();

        let bytes = store.get(&share.blob).unwrap();
        let verified = verify_signed(&bytes, store.as_ref()).await.unwrap();
        let s = verified.schema.as_share().expect("share");
        assert_eq!(s.target, target.blob);
        assert!(s.transitive);
    }
}
