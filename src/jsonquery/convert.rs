//! Conversions between JSON nodes and string-keyed mappings

use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde::Serialize;
use serde_json::Value;

/// Convert an object node into a flat string-keyed mapping
pub fn object_to_map(node: &Value) -> Result<JsonObject> {
    match node {
        Value::Object(map) => Ok(map.clone()),
        _ => Err(Error::NotObject {
            key: "$".to_string(),
        }),
    }
}

/// Convert an array of objects into a list of mappings
pub fn array_to_maps(items: &[Value]) -> Result<Vec<JsonObject>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(Error::NotObject {
                key: format!("[{index}]"),
            }),
        })
        .collect()
}

/// Convert any serializable mapping back into a node by round-tripping JSON
pub fn to_node<T: Serialize>(value: &T) -> Result<Value> {
    let bytes = serde_json::to_vec(value)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Parse a response body; an empty (or whitespace-only) body yields `None`
pub fn parse_body(bytes: &[u8]) -> Result<Option<Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(bytes)?))
}
