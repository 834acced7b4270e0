//! Query implementation

use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;

/// Split a dotted path (`paging.next.link`) into zoom segments and the final key.
///
/// An empty path yields no zoom and an empty key (the root itself).
pub fn split_path(path: &str) -> (Vec<&str>, &str) {
    if path.is_empty() {
        return (Vec::new(), "");
    }
    let mut parts: Vec<&str> = path.split('.').collect();
    let key = parts.pop().unwrap_or("");
    (parts, key)
}

/// Path-based view over a JSON node
#[derive(Debug, Clone)]
pub struct Query<'a> {
    root: &'a Value,
    zoom: Vec<String>,
}

impl<'a> Query<'a> {
    /// Create a query rooted at `root`, zoomed into `zoom` segment by segment
    pub fn new(root: &'a Value, zoom: &[&str]) -> Self {
        Self {
            root,
            zoom: zoom.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Create a query for a dotted path, returning it with the final key
    pub fn at_path(root: &'a Value, path: &str) -> (Self, String) {
        let (zoom, key) = split_path(path);
        (Self::new(root, &zoom), key.to_string())
    }

    /// Name used in errors that refer to the zoomed node itself
    fn self_key(&self) -> String {
        self.zoom.last().cloned().unwrap_or_else(|| "$".to_string())
    }

    /// Descend through the zoom segments; every intermediate must be an object
    fn zoom_in(&self) -> Result<&'a Value> {
        let mut node = self.root;
        let mut parent = "$".to_string();

        for segment in &self.zoom {
            let object = node
                .as_object()
                .ok_or_else(|| Error::NotObject { key: parent.clone() })?;
            node = object.get(segment).ok_or_else(|| Error::KeyNotFound {
                key: segment.clone(),
            })?;
            if node.is_null() {
                return Err(Error::NullJson {
                    key: segment.clone(),
                });
            }
            parent.clone_from(segment);
        }

        Ok(node)
    }

    /// Locate a non-null value under `key` (or the zoomed node for an empty key)
    fn find(&self, key: &str) -> Result<&'a Value> {
        let node = self.zoom_in()?;

        if key.is_empty() {
            if node.is_null() {
                return Err(Error::NullJson {
                    key: self.self_key(),
                });
            }
            return Ok(node);
        }

        let object = node.as_object().ok_or_else(|| Error::NotObject {
            key: self.self_key(),
        })?;
        let value = object.get(key).ok_or_else(|| Error::KeyNotFound {
            key: key.to_string(),
        })?;
        if value.is_null() {
            return Err(Error::NullJson {
                key: key.to_string(),
            });
        }

        Ok(value)
    }

    /// Like `find`, but a missing path or a null becomes `None`
    fn find_optional(&self, key: &str) -> Result<Option<&'a Value>> {
        match self.find(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::KeyNotFound { .. } | Error::NullJson { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn key_name(&self, key: &str) -> String {
        if key.is_empty() {
            self.self_key()
        } else {
            key.to_string()
        }
    }

    // ------------------------------------------------------------------------
    // Integer
    // ------------------------------------------------------------------------

    /// Required integer; a number with a fractional part is rejected
    pub fn integer_required(&self, key: &str) -> Result<i64> {
        let value = self.find(key)?;
        as_integer(value, &self.key_name(key))
    }

    /// Optional integer
    pub fn integer_optional(&self, key: &str) -> Result<Option<i64>> {
        self.find_optional(key)?
            .map(|v| as_integer(v, &self.key_name(key)))
            .transpose()
    }

    // ------------------------------------------------------------------------
    // Float
    // ------------------------------------------------------------------------

    /// Required number
    pub fn float_required(&self, key: &str) -> Result<f64> {
        let value = self.find(key)?;
        value.as_f64().ok_or_else(|| Error::NotNumeric {
            key: self.key_name(key),
        })
    }

    /// Optional number
    pub fn float_optional(&self, key: &str) -> Result<Option<f64>> {
        self.find_optional(key)?
            .map(|v| {
                v.as_f64().ok_or_else(|| Error::NotNumeric {
                    key: self.key_name(key),
                })
            })
            .transpose()
    }

    // ------------------------------------------------------------------------
    // String
    // ------------------------------------------------------------------------

    /// Required string
    pub fn string_required(&self, key: &str) -> Result<&'a str> {
        let value = self.find(key)?;
        value.as_str().ok_or_else(|| Error::NotString {
            key: self.key_name(key),
        })
    }

    /// Optional string
    pub fn string_optional(&self, key: &str) -> Result<Option<&'a str>> {
        self.find_optional(key)?
            .map(|v| {
                v.as_str().ok_or_else(|| Error::NotString {
                    key: self.key_name(key),
                })
            })
            .transpose()
    }

    // ------------------------------------------------------------------------
    // Bool
    // ------------------------------------------------------------------------

    /// Required boolean
    pub fn bool_required(&self, key: &str) -> Result<bool> {
        let value = self.find(key)?;
        value.as_bool().ok_or_else(|| Error::NotBool {
            key: self.key_name(key),
        })
    }

    /// Optional boolean
    pub fn bool_optional(&self, key: &str) -> Result<Option<bool>> {
        self.find_optional(key)?
            .map(|v| {
                v.as_bool().ok_or_else(|| Error::NotBool {
                    key: self.key_name(key),
                })
            })
            .transpose()
    }

    // ------------------------------------------------------------------------
    // Object
    // ------------------------------------------------------------------------

    /// Required object
    pub fn object_required(&self, key: &str) -> Result<&'a JsonObject> {
        let value = self.find(key)?;
        value.as_object().ok_or_else(|| Error::NotObject {
            key: self.key_name(key),
        })
    }

    /// Optional object
    pub fn object_optional(&self, key: &str) -> Result<Option<&'a JsonObject>> {
        self.find_optional(key)?
            .map(|v| {
                v.as_object().ok_or_else(|| Error::NotObject {
                    key: self.key_name(key),
                })
            })
            .transpose()
    }

    // ------------------------------------------------------------------------
    // Array
    // ------------------------------------------------------------------------

    /// Required array
    pub fn array_required(&self, key: &str) -> Result<&'a Vec<Value>> {
        let value = self.find(key)?;
        value.as_array().ok_or_else(|| Error::NotArray {
            key: self.key_name(key),
        })
    }

    /// Optional array
    pub fn array_optional(&self, key: &str) -> Result<Option<&'a Vec<Value>>> {
        self.find_optional(key)?
            .map(|v| {
                v.as_array().ok_or_else(|| Error::NotArray {
                    key: self.key_name(key),
                })
            })
            .transpose()
    }

    // ------------------------------------------------------------------------
    // Untyped
    // ------------------------------------------------------------------------

    /// Required value of any type except null
    pub fn value_required(&self, key: &str) -> Result<&'a Value> {
        self.find(key)
    }

    /// Optional value of any type
    pub fn value_optional(&self, key: &str) -> Result<Option<&'a Value>> {
        self.find_optional(key)
    }

    /// Scalar rendered as a string: strings verbatim, numbers and booleans formatted
    pub fn text_optional(&self, key: &str) -> Result<Option<String>> {
        match self.find_optional(key)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(Error::NotString {
                key: self.key_name(key),
            }),
        }
    }
}

fn as_integer(value: &Value, key: &str) -> Result<i64> {
    let Value::Number(number) = value else {
        return Err(Error::NotNumeric {
            key: key.to_string(),
        });
    };

    if let Some(i) = number.as_i64() {
        return Ok(i);
    }

    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Ok(f as i64),
        _ => Err(Error::NotInteger {
            key: key.to_string(),
        }),
    }
}
