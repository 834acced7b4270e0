//! Uniform request and response envelopes
//!
//! Every provider accepts and returns these shapes; provider-specific
//! details stay inside the adapters.

mod metadata;
mod read;
mod subscription;
mod write;

pub use metadata::{
    FieldMetadata, FieldValue, ListObjectMetadataResult, ObjectMetadata, ValueType,
};
pub use read::{Association, ReadParams, ReadResult, ReadResultRow};
pub use subscription::{
    ObjectEvents, SubscribeParams, SubscriptionEvent, SubscriptionEventType, SubscriptionRequest,
    SubscriptionResult, SubscriptionStatus, WebhookRequest,
};
pub use write::{
    BatchItem, BatchStatus, BatchWriteParams, BatchWriteResult, BatchWriteType, DeleteParams,
    DeleteResult, WriteParams, WriteResult,
};

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Operation kinds gated by the endpoint-support registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Write,
    Delete,
    Subscribe,
    Metadata,
    BatchWrite,
    RecordCount,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Subscribe => "subscribe",
            Self::Metadata => "metadata",
            Self::BatchWrite => "batch_write",
            Self::RecordCount => "record_count",
        };
        f.write_str(s)
    }
}

/// Catalog variables discovered by a probing call after authentication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthInfo {
    /// Discovered values, e.g. `portalId`, `organizationId`, `tenantId`
    pub catalog_vars: BTreeMap<String, String>,
}

impl PostAuthInfo {
    /// Create from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            catalog_vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a discovered value
    pub fn get(&self, key: &str) -> Result<&str> {
        self.catalog_vars
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingPostAuthInfo {
                key: key.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.catalog_vars.is_empty()
    }
}

/// Input for counting records (HubSpot only)
#[derive(Debug, Clone, Default)]
pub struct RecordCountParams {
    pub object_name: String,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Result of counting records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCountResult {
    pub count: u64,
}

/// What kind of name `normalize_entity_name` receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Object,
    Field,
}
