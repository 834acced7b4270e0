//! Field type inference

use crate::model::{FieldMetadata, ObjectMetadata, ValueType};
use crate::types::JsonObject;
use serde_json::Value;

/// Normalized type of a sampled JSON value
pub fn infer_value_type(value: &Value) -> ValueType {
    match value {
        Value::String(_) => ValueType::String,
        Value::Bool(_) => ValueType::Boolean,
        Value::Number(_) => ValueType::Float,
        Value::Array(_) | Value::Object(_) | Value::Null => ValueType::Other,
    }
}

/// Object metadata inferred from a single sampled record
pub fn infer_object_metadata(display_name: &str, record: &JsonObject) -> ObjectMetadata {
    let mut metadata = ObjectMetadata::new(display_name);
    for (name, value) in record {
        let value_type = infer_value_type(value);
        metadata.add_field(name, FieldMetadata::new(name, value_type, json_type_name(value)));
    }
    metadata
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

/// Map a provider `type`/`fieldType` pair to a normalized value type
pub fn map_property_type(provider_type: &str, field_type: &str) -> ValueType {
    match (provider_type, field_type) {
        ("string", _) => ValueType::String,
        ("number", _) => ValueType::Float,
        ("bool", _) => ValueType::Boolean,
        ("date", _) => ValueType::Date,
        ("datetime", _) => ValueType::Datetime,
        ("enumeration", "checkbox") => ValueType::MultiSelect,
        ("enumeration", "booleancheckbox") => ValueType::Boolean,
        ("enumeration", "radio" | "select") => ValueType::SingleSelect,
        _ => ValueType::Other,
    }
}
