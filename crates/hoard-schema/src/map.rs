use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaResult};

/// Schema format version written into every object.
pub const CAMLI_VERSION: u64 = 1;

/// An untyped schema object: a JSON object that always carries
/// `camliVersion` and a string `camliType`.
///
/// This is the form objects are built and signed in. Decode into
/// [`crate::Schema`] to read one.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaMap(Map<String, Value>);

impl SchemaMap {
    /// An empty object of the given type.
    pub fn new(camli_type: &str) -> Self {
        let mut map = Map::new();
        map.insert("camliVersion".into(), Value::from(CAMLI_VERSION));
        map.insert("camliType".into(), Value::from(camli_type));
        Self(map)
    }

    /// Serialize a typed body and tag it with `camli_type`.
    pub(crate) fn from_typed<T: Serialize>(camli_type: &str, body: &T) -> SchemaResult<Self> {
        let mut out = Self::new(camli_type);
        match serde_json::to_value(body)? {
            Value::Object(fields) => {
                for (k, v) in fields {
                    out.0.insert(k, v);
                }
                Ok(out)
            }
            _ => Err(SchemaError::NotAnObject),
        }
    }

    /// Wrap a parsed JSON value, checking the `camliType` discriminator.
    ///
    /// A missing `camliVersion` is filled in; a missing or non-string
    /// `camliType` is an error.
    pub fn from_value(value: Value) -> SchemaResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(SchemaError::NotAnObject);
        };
        match map.get("camliType") {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(SchemaError::InvalidField {
                    field: "camliType",
                    reason: "not a string".into(),
                })
            }
            None => return Err(SchemaError::MissingField("camliType")),
        }
        map.entry("camliVersion")
            .or_insert_with(|| Value::from(CAMLI_VERSION));
        Ok(Self(map))
    }

    /// Parse raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> SchemaResult<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// The `camliType` discriminator.
    pub fn camli_type(&self) -> &str {
        self.0
            .get("camliType")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_sets_version_and_type() {
        let m = SchemaMap::new("permanode");
        assert_eq!(m.camli_type(), "permanode");
        assert_eq!(m.get("camliVersion"), Some(&json!(1)));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn from_value_requires_camli_type() {
        assert!(matches!(
            SchemaMap::from_value(json!({"a": 1})),
            Err(SchemaError::MissingField("camliType"))
        ));
        assert!(matches!(
            SchemaMap::from_value(json!({"camliType": 7})),
            Err(SchemaError::InvalidField { .. })
        ));
        assert!(matches!(
            SchemaMap::from_value(json!([1, 2])),
            Err(SchemaError::NotAnObject)
        ));
    }

    #[test]
    fn from_value_fills_version() {
        let m = SchemaMap::from_value(json!({"camliType": "share"})).unwrap();
        assert_eq!(m.get("camliVersion"), Some(&json!(1)));
    }

    #[test]
    fn from_slice_rejects_garbage() {
        assert!(matches!(
            SchemaMap::from_slice(b"not json"),
            Err(SchemaError::Json(_))
        ));
    }

    #[test]
    fn insert_and_remove() {
        let mut m = SchemaMap::new("file");
        assert!(m.insert("fileName", "a.txt").is_none());
        assert_eq!(m.get_str("fileName"), Some("a.txt"));
        assert!(m.remove("fileName").is_some());
        assert!(!m.contains_key("fileName"));
    }
}
