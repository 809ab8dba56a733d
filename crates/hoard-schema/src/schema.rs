use hoard_types::BlobRef;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SchemaResult;
use crate::map::SchemaMap;

/// A typed schema object body with a fixed `camliType`.
pub trait SchemaBody: Serialize + DeserializeOwned {
    const CAMLI_TYPE: &'static str;

    /// Encode as an untyped, tagged schema map.
    fn to_map(&self) -> SchemaResult<SchemaMap> {
        SchemaMap::from_typed(Self::CAMLI_TYPE, self)
    }
}

/// Filesystem metadata shared by file, symlink and directory objects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Octal permission bits as a string, e.g. `"0644"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unix_permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unix_owner_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unix_group_id: Option<u32>,
    /// RFC 3339 modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unix_mtime: Option<String>,
}

/// One contiguous range of a file's bytes, stored as its own blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPart {
    pub blob_ref: BlobRef,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSchema {
    #[serde(flatten)]
    pub common: FileCommon,
    pub size: u64,
    pub content_parts: Vec<ContentPart>,
}

impl SchemaBody for FileSchema {
    const CAMLI_TYPE: &'static str = "file";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymlinkSchema {
    #[serde(flatten)]
    pub common: FileCommon,
    pub symlink_target: String,
}

impl SchemaBody for SymlinkSchema {
    const CAMLI_TYPE: &'static str = "symlink";
}

/// A directory: its metadata plus the static set holding its entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySchema {
    #[serde(flatten)]
    pub common: FileCommon,
    pub entries: BlobRef,
}

impl SchemaBody for DirectorySchema {
    const CAMLI_TYPE: &'static str = "directory";
}

/// An ordered collection of member blobs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSetSchema {
    #[serde(default)]
    pub members: Vec<BlobRef>,
}

impl SchemaBody for StaticSetSchema {
    const CAMLI_TYPE: &'static str = "static-set";
}

/// A content-free identity anchor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanodeSchema {
    #[serde(rename = "camliSigner", skip_serializing_if = "Option::is_none")]
    pub signer: Option<BlobRef>,
    /// Nonce that makes each permanode's identity unique.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random: Option<String>,
}

impl SchemaBody for PermanodeSchema {
    const CAMLI_TYPE: &'static str = "permanode";
}

/// A read-capability grant for `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSchema {
    pub auth_type: String,
    pub target: BlobRef,
    #[serde(default)]
    pub transitive: bool,
    #[serde(rename = "camliSigner", skip_serializing_if = "Option::is_none")]
    pub signer: Option<BlobRef>,
}

impl SchemaBody for ShareSchema {
    const CAMLI_TYPE: &'static str = "share";
}

/// A signer's public key, stored as an ordinary blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeySchema {
    pub key_type: String,
    /// Hex-encoded key bytes.
    pub public_key: String,
}

impl SchemaBody for PublicKeySchema {
    const CAMLI_TYPE: &'static str = "public-key";
}

/// A decoded schema object, one variant per known `camliType`.
#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
    File(FileSchema),
    Directory(DirectorySchema),
    Permanode(PermanodeSchema),
    Share(ShareSchema),
    Symlink(SymlinkSchema),
    StaticSet(StaticSetSchema),
    PublicKey(PublicKeySchema),
    /// A `camliType` this build does not know; kept verbatim.
    Unknown { camli_type: String, map: SchemaMap },
}

impl Schema {
    /// Decode raw blob bytes.
    pub fn parse(bytes: &[u8]) -> SchemaResult<Self> {
        Self::from_map(SchemaMap::from_slice(bytes)?)
    }

    /// Decode a tagged map into its typed variant.
    pub fn from_map(map: SchemaMap) -> SchemaResult<Self> {
        let camli_type = map.camli_type().to_string();
        Ok(match camli_type.as_str() {
            FileSchema::CAMLI_TYPE => Self::File(decode(map)?),
            DirectorySchema::CAMLI_TYPE => Self::Directory(decode(map)?),
            PermanodeSchema::CAMLI_TYPE => Self::Permanode(decode(map)?),
            ShareSchema::CAMLI_TYPE => Self::Share(decode(map)?),
            SymlinkSchema::CAMLI_TYPE => Self::Symlink(decode(map)?),
            StaticSetSchema::CAMLI_TYPE => Self::StaticSet(decode(map)?),
            PublicKeySchema::CAMLI_TYPE => Self::PublicKey(decode(map)?),
            _ => Self::Unknown { camli_type, map },
        })
    }

    pub fn camli_type(&self) -> &str {
        match self {
            Self::File(_) => FileSchema::CAMLI_TYPE,
            Self::Directory(_) => DirectorySchema::CAMLI_TYPE,
            Self::Permanode(_) => PermanodeSchema::CAMLI_TYPE,
            Self::Share(_) => ShareSchema::CAMLI_TYPE,
            Self::Symlink(_) => SymlinkSchema::CAMLI_TYPE,
            Self::StaticSet(_) => StaticSetSchema::CAMLI_TYPE,
            Self::PublicKey(_) => PublicKeySchema::CAMLI_TYPE,
            Self::Unknown { camli_type, .. } => camli_type,
        }
    }

    pub fn as_share(&self) -> Option<&ShareSchema> {
        match self {
            Self::Share(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileSchema> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectorySchema> {
        match self {
            Self::Directory(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_static_set(&self) -> Option<&StaticSetSchema> {
        match self {
            Self::StaticSet(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_public_key(&self) -> Option<&PublicKeySchema> {
        match self {
            Self::PublicKey(k) => Some(k),
            _ => None,
        }
    }
}

fn decode<T: DeserializeOwned>(map: SchemaMap) -> SchemaResult<T> {
    Ok(serde_json::from_value(map.into_value())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    const TARGET: &str = "sha1-aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";

    #[test]
    fn parse_share() {
        let json = format!(
            r#"{{"camliVersion":1,"camliType":"share","authType":"haveref","target":"{TARGET}","transitive":true,"camliSigner":"{TARGET}","camliSig":"00"}}"#
        );
        let schema = Schema::parse(json.as_bytes()).unwrap();
        let share = schema.as_share().expect("share");
        assert_eq!(share.target.to_string(), TARGET);
        assert!(share.transitive);
        assert_eq!(share.auth_type, "haveref");
        assert!(share.signer.is_some());
        assert_eq!(schema.camli_type(), "share");
    }

    #[test]
    fn share_with_bad_target_fails() {
        let json = r#"{"camliType":"share","authType":"haveref","target":"SHA1-nope"}"#;
        assert!(matches!(
            Schema::parse(json.as_bytes()),
            Err(SchemaError::Json(_))
        ));
    }

    #[test]
    fn unknown_type_is_kept() {
        let schema = Schema::parse(br#"{"camliType":"claim","attr":"title"}"#).unwrap();
        match &schema {
            Schema::Unknown { camli_type, map } => {
                assert_eq!(camli_type, "claim");
                assert_eq!(map.get_str("attr"), Some("title"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(schema.as_share().is_none());
    }

    #[test]
    fn file_roundtrip_through_map() {
        let file = FileSchema {
            common: FileCommon {
                file_name: Some("a.txt".into()),
                unix_permission: Some("0644".into()),
                ..Default::default()
            },
            size: 5,
            content_parts: vec![ContentPart {
                blob_ref: BlobRef::parse(TARGET).unwrap(),
                size: 5,
            }],
        };
        let map = file.to_map().unwrap();
        assert_eq!(map.camli_type(), "file");
        assert_eq!(map.get_str("fileName"), Some("a.txt"));
        assert!(!map.contains_key("unixMtime"));
        assert_eq!(Schema::from_map(map).unwrap(), Schema::File(file));
    }

    #[test]
    fn static_set_members_default_empty() {
        let schema = Schema::parse(br#"{"camliType":"static-set"}"#).unwrap();
        assert!(schema.as_static_set().unwrap().members.is_empty());
    }

    #[test]
    fn missing_required_field_is_error() {
        assert!(Schema::parse(br#"{"camliType":"directory","fileName":"d"}"#).is_err());
    }
}
