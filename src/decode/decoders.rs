//! Record extraction and field projection

use super::types::{RecordDecoder, RecordShape, RecordsLayout};
use crate::error::{Error, Result};
use crate::jsonquery::{array_to_maps, Query};
use crate::model::ReadResultRow;
use crate::types::JsonObject;
use serde_json::Value;
use std::collections::BTreeSet;

impl RecordDecoder {
    /// Extract raw records from a response body
    ///
    /// A missing or null records path yields no records.
    pub fn extract(&self, body: &Value) -> Result<Vec<JsonObject>> {
        let (q, key) = Query::at_path(body, self.path);

        let items: Vec<Value> = match self.layout {
            RecordsLayout::Array => match q.array_optional(&key)? {
                Some(items) => items.clone(),
                None => return Ok(Vec::new()),
            },
            RecordsLayout::MapValues => match q.object_optional(&key)? {
                Some(map) => map.values().cloned().collect(),
                None => return Ok(Vec::new()),
            },
        };

        let Some(inner) = self.unwrap else {
            return array_to_maps(&items);
        };

        items
            .iter()
            .map(|item| {
                let node = Query::new(item, &[]).object_required(inner)?;
                Ok(node.clone())
            })
            .collect()
    }
}

impl RecordShape {
    /// Flattened view used for projection
    pub fn project(&self, raw: &JsonObject) -> Result<JsonObject> {
        match *self {
            Self::Plain => Ok(raw.clone()),

            Self::Nested { key, required } => {
                let mut view = raw.clone();
                match view.remove(key) {
                    Some(Value::Object(nested)) => {
                        view.extend(nested);
                        Ok(view)
                    }
                    Some(Value::Null) | None if !required => Ok(view),
                    Some(Value::Null) | None => Err(Error::missing_values(format!(
                        "record has no '{key}' object"
                    ))),
                    Some(_) => Err(Error::NotObject {
                        key: key.to_string(),
                    }),
                }
            }

            Self::CustomFields {
                array,
                label,
                value,
            } => {
                let mut view = raw.clone();
                let node = Value::Object(raw.clone());
                let (q, last) = Query::at_path(&node, array);
                let Some(entries) = q.array_optional(&last)? else {
                    return Ok(view);
                };

                for entry in entries {
                    let entry_q = Query::new(entry, &[]);
                    let Some(name) = entry_q.string_optional(label)? else {
                        continue;
                    };
                    let key = custom_field_key(name);
                    if key.is_empty() || view.contains_key(&key) {
                        continue;
                    }
                    let v = entry_q.value_optional(value)?.cloned().unwrap_or(Value::Null);
                    view.insert(key, v);
                }
                Ok(view)
            }
        }
    }
}

/// Stable key derived from a human label
///
/// Lowercased, non-alphanumerics become `_`, runs collapse, and a leading
/// digit gets a `custom_` prefix.
pub fn custom_field_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            key.extend(ch.to_lowercase());
        } else if !key.is_empty() && !key.ends_with('_') {
            key.push('_');
        }
    }
    while key.ends_with('_') {
        key.pop();
    }

    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert_str(0, "custom_");
    }
    key
}

/// Projects requested fields from records into rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marshaller {
    pub shape: RecordShape,
    /// Dotted path to the record id in the flattened view
    pub id_field: &'static str,
}

impl Default for Marshaller {
    fn default() -> Self {
        Self {
            shape: RecordShape::Plain,
            id_field: "id",
        }
    }
}

impl Marshaller {
    pub const fn new(shape: RecordShape, id_field: &'static str) -> Self {
        Self { shape, id_field }
    }

    /// Build rows; `fields` are expected lowercase
    pub fn marshal(&self, records: Vec<JsonObject>, fields: &BTreeSet<String>) -> Result<Vec<ReadResultRow>> {
        records
            .into_iter()
            .map(|raw| {
                let view = self.shape.project(&raw)?;
                let id = record_id(&view, self.id_field)?;
                Ok(ReadResultRow {
                    id,
                    fields: select_fields(&view, fields),
                    raw,
                    ..Default::default()
                })
            })
            .collect()
    }
}

/// Default marshaller: plain records, `id` key
pub fn get_marshaled_data(records: Vec<JsonObject>, fields: &BTreeSet<String>) -> Result<Vec<ReadResultRow>> {
    Marshaller::default().marshal(records, fields)
}

fn record_id(view: &JsonObject, id_field: &str) -> Result<String> {
    if id_field.is_empty() {
        return Ok(String::new());
    }
    let node = Value::Object(view.clone());
    let (q, key) = Query::at_path(&node, id_field);
    Ok(q.text_optional(&key)?.unwrap_or_default())
}

/// Pick requested fields, matching keys case-insensitively
fn select_fields(view: &JsonObject, fields: &BTreeSet<String>) -> JsonObject {
    let mut out = JsonObject::new();
    for field in fields {
        let found = view.get(field).or_else(|| {
            view.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(field))
                .map(|(_, v)| v)
        });
        if let Some(value) = found {
            out.insert(field.to_lowercase(), value.clone());
        }
    }
    out
}
