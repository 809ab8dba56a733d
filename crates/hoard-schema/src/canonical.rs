//! Canonical JSON encoding.
//!
//! The canonical form is the only representation of a schema object that is
//! ever hashed or signed:
//!
//! - `camliVersion` comes first, then every other key in byte-wise
//!   lexicographic order, recursively for nested objects.
//! - No whitespace between tokens and no trailing newline.
//! - Strings and numbers use serde_json's escaping and number formatting.
//!
//! Ordering is imposed here rather than inherited from the map type, so the
//! output does not depend on whether serde_json preserves insertion order.

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::map::SchemaMap;

/// Encode a schema object to its canonical JSON text.
pub fn to_canonical_json(map: &SchemaMap) -> SchemaResult<String> {
    let fields = map.as_map();
    if !matches!(fields.get("camliType"), Some(Value::String(_))) {
        return Err(SchemaError::MissingField("camliType"));
    }
    let version = fields
        .get("camliVersion")
        .ok_or(SchemaError::MissingField("camliVersion"))?;

    let mut out = String::with_capacity(128);
    out.push_str("{\"camliVersion\":");
    write_value(&mut out, version)?;

    let mut keys: Vec<&String> = fields.keys().filter(|k| *k != "camliVersion").collect();
    keys.sort();
    for key in keys {
        out.push(',');
        write_key(&mut out, key)?;
        write_value(&mut out, &fields[key.as_str()])?;
    }
    out.push('}');
    Ok(out)
}

fn write_key(out: &mut String, key: &str) -> SchemaResult<()> {
    out.push_str(&serde_json::to_string(key)?);
    out.push(':');
    Ok(())
}

fn write_value(out: &mut String, value: &Value) -> SchemaResult<()> {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(fields) => {
            out.push('{');
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_key(out, key)?;
                write_value(out, &fields[key.as_str()])?;
            }
            out.push('}');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}
