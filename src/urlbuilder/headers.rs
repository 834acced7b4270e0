//! Request headers

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// How a header is applied to the outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Replace any existing value
    #[default]
    Overwrite,
    /// Add alongside existing values
    Append,
}

/// A single header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
    pub mode: HeaderMode,
}

impl Header {
    /// Header that overwrites existing values
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            mode: HeaderMode::Overwrite,
        }
    }

    /// Header appended to existing values
    pub fn append(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            mode: HeaderMode::Append,
        }
    }
}

/// Ordered list of headers, applied first to last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<Header>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: Header) -> &mut Self {
        self.0.push(header);
        self
    }

    /// Add an overwriting header
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(Header::new(key, value))
    }

    /// Add an appended header
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(Header::append(key, value))
    }

    pub fn extend(&mut self, other: &Headers) -> &mut Self {
        self.0.extend(other.0.iter().cloned());
        self
    }

    /// Last value set for a key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|h| h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply to a header map using each header's mode
    pub fn apply(&self, map: &mut HeaderMap) -> Result<()> {
        for header in &self.0 {
            let name = HeaderName::from_bytes(header.key.as_bytes()).map_err(|e| {
                Error::invalid_params(format!("invalid header name '{}': {e}", header.key))
            })?;
            let value = HeaderValue::from_str(&header.value).map_err(|e| {
                Error::invalid_params(format!("invalid value for header '{}': {e}", header.key))
            })?;
            match header.mode {
                HeaderMode::Overwrite => {
                    map.insert(name, value);
                }
                HeaderMode::Append => {
                    map.append(name, value);
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
