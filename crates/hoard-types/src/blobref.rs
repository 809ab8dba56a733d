use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Digest lengths (in hex characters) for the hash schemes we know about.
///
/// A scheme listed here is validated on parse even when no hash function is
/// available for it (`md5` is recognised but never computed).
pub const KNOWN_DIGEST_LENGTHS: &[(&str, usize)] = &[
    ("md5", 32),
    ("sha1", 40),
    ("sha256", 64),
    ("blake3", 64),
];

/// Expected hex digest length for `scheme`, if the scheme is known.
pub fn expected_digest_len(scheme: &str) -> Option<usize> {
    KNOWN_DIGEST_LENGTHS
        .iter()
        .find(|(name, _)| *name == scheme)
        .map(|(_, len)| *len)
}

/// Content-addressed reference to a blob: `scheme-digest`.
///
/// Two references are equal iff both the scheme and the digest match
/// exactly. Digests are always lowercase hex. References with an unknown
/// scheme parse fine (forward compatibility) but nothing can verify bytes
/// against them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobRef {
    scheme: String,
    digest: String,
}

impl BlobRef {
    /// Parse the `scheme-digest` string form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let (scheme, digest) = s
            .split_once('-')
            .ok_or_else(|| TypeError::invalid(s, "missing '-' separator"))?;

        if scheme.is_empty() {
            return Err(TypeError::invalid(s, "empty hash scheme"));
        }
        if !scheme
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(TypeError::invalid(s, "hash scheme must be lowercase alphanumeric"));
        }
        if digest.is_empty() {
            return Err(TypeError::invalid(s, "empty digest"));
        }
        if !digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(TypeError::invalid(s, "digest must be lowercase hex"));
        }
        if let Some(expected) = expected_digest_len(scheme) {
            if digest.len() != expected {
                return Err(TypeError::InvalidLength {
                    scheme: scheme.to_string(),
                    expected,
                    actual: digest.len(),
                });
            }
        }

        Ok(Self {
            scheme: scheme.to_string(),
            digest: digest.to_string(),
        })
    }

    /// Build a reference from a finished raw digest.
    ///
    /// Used by the producer side after hashing; the digest is hex-encoded in
    /// lowercase.
    pub fn from_digest(scheme: &str, digest: &[u8]) -> Self {
        Self {
            scheme: scheme.to_string(),
            digest: hex::encode(digest),
        }
    }

    /// The hash scheme name, e.g. `sha1`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The lowercase hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Returns `true` if the raw digest bytes hash to this reference.
    pub fn matches_digest(&self, digest: &[u8]) -> bool {
        hex::encode(digest) == self.digest
    }

    /// Short form for logs (scheme plus the first 8 hex characters).
    pub fn short(&self) -> String {
        let end = self.digest.len().min(8);
        format!("{}-{}", self.scheme, &self.digest[..end])
    }
}

impl fmt::Debug for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobRef({}-{})", self.scheme, self.digest)
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.scheme, self.digest)
    }
}

impl FromStr for BlobRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BlobRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlobRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
