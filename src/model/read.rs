//! Read envelopes

use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Input of a paginated read
#[derive(Debug, Clone, Default)]
pub struct ReadParams {
    /// Object to read (e.g. `contacts`)
    pub object_name: String,
    /// Fields to project into each row
    pub fields: BTreeSet<String>,
    /// Opaque token from a previous result; empty for the first page
    pub next_page: String,
    /// Only records updated at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only records updated before this instant
    pub until: Option<DateTime<Utc>>,
    /// Requested page size; the adapter default applies when unset
    pub page_size: Option<u32>,
    /// Read archived/deleted records instead of live ones
    pub deleted: bool,
    /// Related objects whose ids should be attached to each row
    pub associated_objects: Vec<String>,
    /// Provider-native filter expression
    pub filter: Option<String>,
}

impl ReadParams {
    /// Create read params for an object
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            ..Default::default()
        }
    }

    /// Set the projected fields
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Continue from a previous page
    #[must_use]
    pub fn next_page(mut self, token: impl Into<String>) -> Self {
        self.next_page = token.into();
        self
    }

    /// Set the incremental lower bound
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Set the incremental upper bound
    #[must_use]
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Read deleted records
    #[must_use]
    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    /// Attach associations to these objects
    #[must_use]
    pub fn associated_objects<I, S>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associated_objects = objects.into_iter().map(Into::into).collect();
        self
    }

    /// Set a provider-native filter
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Lowercased projection, as used by the marshallers
    pub fn lowercase_fields(&self) -> BTreeSet<String> {
        self.fields.iter().map(|f| f.to_lowercase()).collect()
    }
}

/// A related record attached to a row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub object_id: String,
    pub association_type: String,
    pub raw: Option<JsonObject>,
}

/// One record of a read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResultRow {
    /// Record identifier; empty for composite identities
    pub id: String,
    /// Requested projection
    pub fields: JsonObject,
    /// Verbatim record
    pub raw: JsonObject,
    /// Related object name to associated records
    pub associations: HashMap<String, Vec<Association>>,
}

/// One page of a read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    /// Number of rows in `data`
    pub rows: usize,
    /// Rows in provider order
    pub data: Vec<ReadResultRow>,
    /// Token for the next page; empty when done
    pub next_page: String,
    /// True when there are no more pages
    pub done: bool,
}

impl ReadResult {
    /// Build a result; `rows` and `done` are derived
    pub fn new(data: Vec<ReadResultRow>, next_page: String) -> Self {
        Self {
            rows: data.len(),
            done: next_page.is_empty(),
            data,
            next_page,
        }
    }
}
