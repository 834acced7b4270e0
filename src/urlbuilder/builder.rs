//! URL builder

use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Builder for request URLs
///
/// Path segments are percent-encoded, query values are form-encoded, and a
/// query key can only appear once (last write wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    url: Url,
    query: Vec<(String, String)>,
}

impl UrlBuilder {
    /// Create a builder from a base URL and path segments
    ///
    /// Segments may contain `/`; each part is appended separately.
    pub fn new(base: &str, segments: &[&str]) -> Result<Self> {
        let url = Url::parse(base.trim_end_matches('/'))?;
        let mut builder = Self::from_raw_url(&url)?;
        for segment in segments {
            builder.add_path(segment);
        }
        Ok(builder)
    }

    /// Create a builder from an already-parsed URL (e.g. a next-page link)
    pub fn from_raw_url(url: &Url) -> Result<Self> {
        if url.cannot_be_a_base() {
            return Err(Error::invalid_params(format!(
                "URL cannot be used as a base: {url}"
            )));
        }

        let mut query: Vec<(String, String)> = Vec::new();
        for (k, v) in url.query_pairs() {
            set_pair(&mut query, k.into_owned(), v.into_owned());
        }

        let mut url = url.clone();
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self { url, query })
    }

    /// Parse a raw URL string
    pub fn parse(raw: &str) -> Result<Self> {
        Self::from_raw_url(&Url::parse(raw)?)
    }

    /// Append a static path, split on `/`; empty parts are skipped
    pub fn add_path(&mut self, segment: &str) -> &mut Self {
        // cannot-be-a-base URLs are rejected at construction
        if let Ok(mut segments) = self.url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(segment.split('/').filter(|part| !part.is_empty()));
        }
        self
    }

    /// Append one path segment as-is; `/` inside it is percent-encoded
    ///
    /// Used for caller-supplied ids, which must stay a single segment.
    pub fn push_segment(&mut self, segment: &str) -> &mut Self {
        if let Ok(mut segments) = self.url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        self
    }

    /// Set or overwrite a query parameter
    pub fn with_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        set_pair(&mut self.query, key.into(), value.into());
        self
    }

    /// Remove a query parameter
    pub fn remove_query_param(&mut self, key: &str) -> &mut Self {
        self.query.retain(|(k, _)| k != key);
        self
    }

    /// Current value of a query parameter
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as a parsed URL
    pub fn to_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        url
    }

    /// Path of the URL, without query
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl fmt::Display for UrlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_url())
    }
}

fn set_pair(query: &mut Vec<(String, String)>, key: String, value: String) {
    if let Some(existing) = query.iter_mut().find(|(k, _)| *k == key) {
        existing.1 = value;
    } else {
        query.push((key, value));
    }
}
