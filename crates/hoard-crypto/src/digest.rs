use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use hoard_types::BlobRef;
use sha1::Digest;

/// A running hash computation for one scheme.
///
/// Implemented for every hash function the registry can hand out. The
/// finished digest is returned as raw bytes; hex encoding is the
/// [`BlobRef`]'s business.
pub trait StreamHasher: Send {
    /// Feed more bytes into the hash.
    fn update(&mut self, data: &[u8]);
    /// Consume the hasher and return the raw digest.
    fn finish(self: Box<Self>) -> Vec<u8>;
}

impl StreamHasher for sha1::Sha1 {
    fn update(&mut self, data: &[u8]) {
        Digest::update(self, data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        Digest::finalize(*self).to_vec()
    }
}

impl StreamHasher for sha2::Sha256 {
    fn update(&mut self, data: &[u8]) {
        Digest::update(self, data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        Digest::finalize(*self).to_vec()
    }
}

impl StreamHasher for blake3::Hasher {
    fn update(&mut self, data: &[u8]) {
        blake3::Hasher::update(self, data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.finalize().as_bytes().to_vec()
    }
}

/// Constructor for a fresh hasher of one scheme.
pub type HasherCtor = fn() -> Box<dyn StreamHasher>;

/// A running hash tagged with the scheme that produced it.
pub struct HashState {
    scheme: &'static str,
    inner: Box<dyn StreamHasher>,
}

impl HashState {
    /// The scheme this state hashes with.
    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    /// Feed more bytes into the hash.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finish the hash and name the result.
    pub fn into_blobref(self) -> BlobRef {
        let digest = self.inner.finish();
        BlobRef::from_digest(self.scheme, &digest)
    }

    /// Returns `true` iff this hash finishes to exactly `blob`.
    pub fn matches(self, blob: &BlobRef) -> bool {
        self.scheme == blob.scheme() && blob.matches_digest(&self.inner.finish())
    }
}

impl Write for HashState {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for HashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashState({})", self.scheme)
    }
}

/// Registry of hash schemes that can actually be computed.
///
/// Built once at startup and passed to whoever needs to hash. Parsing a
/// [`BlobRef`] never consults the registry; only producing or verifying
/// bytes does.
#[derive(Clone)]
pub struct DigestRegistry {
    schemes: BTreeMap<&'static str, HasherCtor>,
}

impl DigestRegistry {
    /// The scheme new blobs are written with unless configured otherwise.
    pub const DEFAULT_SCHEME: &'static str = "sha1";

    /// A registry with no schemes.
    pub fn empty() -> Self {
        Self {
            schemes: BTreeMap::new(),
        }
    }

    /// `sha1`, `sha256` and `blake3`.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("sha1", || -> Box<dyn StreamHasher> { Box::new(sha1::Sha1::new()) });
        registry.register("sha256", || -> Box<dyn StreamHasher> {
            Box::new(sha2::Sha256::new())
        });
        registry.register("blake3", || -> Box<dyn StreamHasher> {
            Box::new(blake3::Hasher::new())
        });
        registry
    }

    /// Add (or replace) a scheme.
    pub fn register(&mut self, scheme: &'static str, ctor: HasherCtor) {
        self.schemes.insert(scheme, ctor);
    }

    /// Whether `scheme` can be computed.
    pub fn is_supported(&self, scheme: &str) -> bool {
        self.schemes.contains_key(scheme)
    }

    /// Names of all registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&'static str> {
        self.schemes.keys().copied().collect()
    }

    /// A fresh running hash for `scheme`.
    pub fn hash_state(&self, scheme: &str) -> Result<HashState, DigestError> {
        let (name, ctor) = self
            .schemes
            .get_key_value(scheme)
            .ok_or_else(|| DigestError::UnsupportedScheme(scheme.to_string()))?;
        Ok(HashState {
            scheme: *name,
            inner: ctor(),
        })
    }

    /// Hash an in-memory byte slice.
    pub fn digest_bytes(&self, scheme: &str, data: &[u8]) -> Result<BlobRef, DigestError> {
        let mut state = self.hash_state(scheme)?;
        state.update(data);
        Ok(state.into_blobref())
    }

    /// Hash a whole seekable stream from its start.
    ///
    /// The reader is rewound to position 0 first and read to the end.
    /// Returns the reference and the number of bytes hashed.
    pub fn digest_reader<R: Read + Seek>(
        &self,
        scheme: &str,
        reader: &mut R,
    ) -> Result<(BlobRef, u64), DigestError> {
        let mut state = self.hash_state(scheme)?;
        reader.seek(SeekFrom::Start(0))?;
        let size = io::copy(reader, &mut state)?;
        Ok((state.into_blobref(), size))
    }

    /// Verify that `data` hashes to `blob`.
    pub fn verify(&self, blob: &BlobRef, data: &[u8]) -> Result<bool, DigestError> {
        let mut state = self.hash_state(blob.scheme())?;
        state.update(data);
        Ok(state.matches(blob))
    }
}

impl Default for DigestRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for DigestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("unsupported hash scheme: {0}")]
    UnsupportedScheme(String),

    #[error("I/O error while hashing: {0}")]
    Io(#[from] io::Error),
}
