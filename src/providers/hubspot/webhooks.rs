//! HubSpot webhook signatures and events
//!
//! Subscriptions belong to the HubSpot app, not the connection, so only
//! verification and parsing live here. Deliveries are JSON arrays.

use super::plural;
use crate::error::{Error, Result};
use crate::model::{SubscriptionEvent, SubscriptionEventType, WebhookRequest};
use crate::providers::signature::{digest_matches_hex, header_str, sha256};
use crate::providers::Webhooks;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub(crate) const SIGNATURE_HEADER: &str = "X-HubSpot-Signature";

const STANDARD_EVENTS: &[SubscriptionEventType] = &[
    SubscriptionEventType::Create,
    SubscriptionEventType::Update,
    SubscriptionEventType::Delete,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HubspotWebhooks;

#[async_trait]
impl Webhooks for HubspotWebhooks {
    fn allowed_events(&self, object: &str) -> &'static [SubscriptionEventType] {
        match object {
            "contacts" | "companies" | "deals" | "tickets" => STANDARD_EVENTS,
            _ => &[],
        }
    }

    /// v1 signature: hex SHA-256 of the client secret followed by the body
    fn verify_webhook_message(&self, request: &WebhookRequest, signing_key: &str) -> Result<bool> {
        let signature = header_str(&request.headers, SIGNATURE_HEADER)?;
        let actual = sha256(&[signing_key.as_bytes(), &request.body]);
        let valid = digest_matches_hex(&actual, signature);
        if !valid {
            debug!("hubspot signature mismatch");
        }
        Ok(valid)
    }

    fn parse_events(&self, body: &[u8]) -> Result<Vec<Box<dyn SubscriptionEvent>>> {
        let raw: Vec<Value> = serde_json::from_slice(body)?;
        raw.into_iter()
            .map(|v| HubspotEvent::new(v).map(|e| Box::new(e) as Box<dyn SubscriptionEvent>))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fields {
    subscription_type: String,
    object_id: Value,
    portal_id: Value,
    occurred_at: i64,
    #[serde(default)]
    event_id: Option<Value>,
    #[serde(default)]
    property_name: Option<String>,
    #[serde(default)]
    property_value: Option<Value>,
}

/// One entry of a HubSpot delivery
#[derive(Debug, Clone, PartialEq)]
pub struct HubspotEvent {
    fields: Fields,
    raw: Value,
}

/// Numbers and strings both render as plain text
fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl HubspotEvent {
    pub fn new(raw: Value) -> Result<Self> {
        let fields = Fields::deserialize(&raw)?;
        Ok(Self { fields, raw })
    }

    /// `contact.propertyChange` -> (`contact`, `propertyChange`)
    fn split(&self) -> Result<(&str, &str)> {
        self.fields
            .subscription_type
            .split_once('.')
            .ok_or_else(|| Error::InvalidEventType {
                event: self.fields.subscription_type.clone(),
            })
    }

    /// Changed property, for `propertyChange` events
    pub fn property_name(&self) -> Option<&str> {
        self.fields.property_name.as_deref()
    }

    pub fn property_value(&self) -> Option<&Value> {
        self.fields.property_value.as_ref()
    }

    pub fn event_id(&self) -> Option<String> {
        self.fields.event_id.as_ref().map(id_text)
    }
}

impl SubscriptionEvent for HubspotEvent {
    fn event_type(&self) -> Result<SubscriptionEventType> {
        let (_, action) = self.split()?;
        Ok(match action {
            "creation" | "restore" => SubscriptionEventType::Create,
            "propertyChange" | "associationChange" | "merge" => SubscriptionEventType::Update,
            "deletion" | "privacyDeletion" => SubscriptionEventType::Delete,
            _ => SubscriptionEventType::Other,
        })
    }

    fn raw_event_name(&self) -> Result<String> {
        Ok(self.fields.subscription_type.clone())
    }

    /// `contact.creation` belongs to `contacts`
    fn object_name(&self) -> Result<String> {
        let (object, _) = self.split()?;
        Ok(plural(&object.to_lowercase()))
    }

    fn record_id(&self) -> Result<String> {
        Ok(id_text(&self.fields.object_id))
    }

    fn workspace(&self) -> Result<String> {
        Ok(id_text(&self.fields.portal_id))
    }

    fn event_timestamp_nano(&self) -> Result<i64> {
        self.fields
            .occurred_at
            .checked_mul(1_000_000)
            .ok_or_else(|| {
                Error::missing_values(format!(
                    "occurredAt {} out of range",
                    self.fields.occurred_at
                ))
            })
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}
