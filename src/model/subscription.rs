//! Webhook subscription envelopes and event normalization

use crate::error::Result;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Normalized webhook event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionEventType {
    Create,
    Update,
    Delete,
    Other,
}

impl fmt::Display for SubscriptionEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Events requested for one object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEvents {
    pub events: Vec<SubscriptionEventType>,
    /// Provider event names forwarded verbatim
    #[serde(default)]
    pub passthrough_events: Vec<String>,
}

impl ObjectEvents {
    pub fn new(events: impl IntoIterator<Item = SubscriptionEventType>) -> Self {
        Self {
            events: events.into_iter().collect(),
            passthrough_events: Vec::new(),
        }
    }
}

/// Provider-facing part of a subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Callback URL receiving the events
    pub webhook_url: String,
    pub signing_key: Option<String>,
    /// Organization identifier; filled from post-auth info when missing
    pub organization: Option<String>,
    /// User identifier; filled from post-auth info when missing
    pub user: Option<String>,
    pub scope: Option<String>,
    pub description: Option<String>,
}

/// Input of subscribe and update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeParams {
    pub request: SubscriptionRequest,
    pub subscription_events: BTreeMap<String, ObjectEvents>,
}

/// Lifecycle state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Success,
    Pending,
    Failed,
}

/// A created subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionResult {
    pub status: SubscriptionStatus,
    /// Provider subscription (or endpoint) identifier
    pub id: String,
    /// Provider descriptor, verbatim
    pub result: Value,
    pub events: BTreeMap<String, ObjectEvents>,
}

/// A signed webhook delivery
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Normalized view over one incoming webhook event
pub trait SubscriptionEvent: Send + Sync + fmt::Debug {
    /// Uniform kind of this event
    fn event_type(&self) -> Result<SubscriptionEventType>;

    /// Provider event name (e.g. `invitee.created`)
    fn raw_event_name(&self) -> Result<String>;

    /// Object the event refers to
    fn object_name(&self) -> Result<String>;

    /// Identifier of the affected record
    fn record_id(&self) -> Result<String>;

    /// Workspace (portal, organization, account) the event belongs to
    fn workspace(&self) -> Result<String>;

    /// Event time in nanoseconds since the epoch
    fn event_timestamp_nano(&self) -> Result<i64>;

    /// The event payload, verbatim
    fn raw(&self) -> &Value;
}
