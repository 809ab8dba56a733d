//! Constructors for unsigned schema maps.
//!
//! Everything here is pure: callers canonicalize, sign and store the
//! results themselves.

use hoard_types::BlobRef;
use rand::RngCore;

use crate::error::SchemaResult;
use crate::map::SchemaMap;
use crate::schema::{
    ContentPart, DirectorySchema, FileCommon, FileSchema, PermanodeSchema, SchemaBody,
    ShareSchema, StaticSetSchema, SymlinkSchema,
};

/// Share auth type: anyone holding the share's ref may read its target.
pub const AUTH_HAVEREF: &str = "haveref";

/// Bytes of randomness in a unique permanode's nonce.
const PERMANODE_NONCE_LEN: usize = 20;

/// A permanode with no fields beyond its type.
///
/// Two such permanodes signed by the same key are byte-identical, so they
/// share one identity. Use [`new_unique_permanode`] for a fresh anchor.
pub fn new_permanode() -> SchemaMap {
    SchemaMap::new(PermanodeSchema::CAMLI_TYPE)
}

/// A permanode carrying a random `random` nonce.
pub fn new_unique_permanode<R: RngCore + ?Sized>(rng: &mut R) -> SchemaMap {
    let mut nonce = [0u8; PERMANODE_NONCE_LEN];
    rng.fill_bytes(&mut nonce);
    let mut map = new_permanode();
    map.insert("random", hex::encode(nonce));
    map
}

/// A `haveref` share granting read access to `target`.
pub fn new_share(target: &BlobRef, transitive: bool) -> SchemaMap {
    let mut map = SchemaMap::new(ShareSchema::CAMLI_TYPE);
    map.insert("authType", AUTH_HAVEREF);
    map.insert("target", target.to_string());
    map.insert("transitive", transitive);
    map
}

pub fn new_file(common: &FileCommon, size: u64, parts: Vec<ContentPart>) -> SchemaResult<SchemaMap> {
    FileSchema {
        common: common.clone(),
        size,
        content_parts: parts,
    }
    .to_map()
}

pub fn new_symlink(common: &FileCommon, target: impl Into<String>) -> SchemaResult<SchemaMap> {
    SymlinkSchema {
        common: common.clone(),
        symlink_target: target.into(),
    }
    .to_map()
}

/// A directory whose entries are listed by the static set `entries`.
pub fn new_directory(common: &FileCommon, entries: &BlobRef) -> SchemaResult<SchemaMap> {
    DirectorySchema {
        common: common.clone(),
        entries: entries.clone(),
    }
    .to_map()
}

/// Builder for a static set. Members keep insertion order.
#[derive(Clone, Debug, Default)]
pub struct StaticSet {
    members: Vec<BlobRef>,
}

impl StaticSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, member: BlobRef) -> &mut Self {
        self.members.push(member);
        self
    }

    pub fn members(&self) -> &[BlobRef] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn to_map(&self) -> SchemaResult<SchemaMap> {
        StaticSetSchema {
            members: self.members.clone(),
        }
        .to_map()
    }
}

impl FromIterator<BlobRef> for StaticSet {
    fn from_iter<I: IntoIterator<Item = BlobRef>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
