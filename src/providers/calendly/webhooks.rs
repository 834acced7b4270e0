//! Calendly webhook subscriptions, signatures and events

use super::{uri_id, ORGANIZATION_KEY, USER_KEY};
use crate::error::{Error, Result};
use crate::handlers::HandlerContext;
use crate::jsonquery::Query;
use crate::model::{
    SubscribeParams, SubscriptionEvent, SubscriptionEventType, SubscriptionResult,
    SubscriptionStatus, WebhookRequest,
};
use crate::providers::signature::{header_str, verify_hmac_sha256};
use crate::providers::Webhooks;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::debug;

pub(crate) const SIGNATURE_HEADER: &str = "Calendly-Webhook-Signature";
pub(crate) const TIMESTAMP_HEADER: &str = "Calendly-Webhook-Timestamp";

/// Oldest accepted delivery, in seconds
const MAX_SIGNATURE_AGE: i64 = 300;

/// Provider event name of a uniform event on an object
fn event_name(object: &str, event: SubscriptionEventType) -> Option<&'static str> {
    match (object, event) {
        ("invitees", SubscriptionEventType::Create) => Some("invitee.created"),
        ("invitees", SubscriptionEventType::Delete) => Some("invitee.canceled"),
        ("routing_form_submissions", SubscriptionEventType::Create) => {
            Some("routing_form_submission.created")
        }
        _ => None,
    }
}

/// Calendly event names requested by the params, passthrough names included
fn requested_events(params: &SubscribeParams) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for (object, events) in &params.subscription_events {
        for event in &events.events {
            let name = event_name(object, *event).ok_or_else(|| Error::InvalidEventType {
                event: format!("{object}.{event}"),
            })?;
            names.push(name.to_string());
        }
        names.extend(events.passthrough_events.iter().cloned());
    }
    names.sort();
    names.dedup();
    Ok(names)
}

/// Calendly webhook lifecycle
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendlyWebhooks;

impl CalendlyWebhooks {
    /// Verify a delivery against a fixed clock
    pub fn verify_at(
        &self,
        request: &WebhookRequest,
        signing_key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let signature = header_str(&request.headers, SIGNATURE_HEADER)?;
        let timestamp = header_str(&request.headers, TIMESTAMP_HEADER)?;

        let sent_at: i64 = timestamp.parse().map_err(|_| Error::InvalidSignature {
            message: format!("malformed timestamp '{timestamp}'"),
        })?;
        if now.timestamp() - sent_at > MAX_SIGNATURE_AGE {
            debug!(sent_at, "stale calendly webhook delivery");
            return Ok(false);
        }

        let Ok(tag) = STANDARD.decode(signature) else {
            return Ok(false);
        };
        let mut message = Vec::with_capacity(timestamp.len() + 1 + request.body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.push(b'.');
        message.extend_from_slice(&request.body);

        verify_hmac_sha256(signing_key.as_bytes(), &message, &tag)
    }

    async fn create(&self, hc: &HandlerContext<'_>, params: &SubscribeParams) -> Result<SubscriptionResult> {
        let events = requested_events(params)?;
        let request = &params.request;

        let organization = match &request.organization {
            Some(org) => org.as_str(),
            None => hc.post_auth_value(ORGANIZATION_KEY)?,
        };
        let scope = request.scope.as_deref().unwrap_or("organization");

        let mut body = json!({
            "url": request.webhook_url,
            "events": events,
            "organization": organization,
            "scope": scope,
        });
        if scope == "user" {
            let user = match &request.user {
                Some(user) => user.as_str(),
                None => hc.post_auth_value(USER_KEY)?,
            };
            body["user"] = json!(user);
        }
        if let Some(key) = &request.signing_key {
            body["signing_key"] = json!(key);
        }

        let url = hc.module_path("webhook_subscriptions")?;
        let response = hc
            .client
            .post(hc.ctx, &url.to_url(), Some(body), hc.headers)
            .await?;
        let descriptor = response.require_body()?.clone();

        let uri = Query::new(&descriptor, &["resource"]).string_required("uri")?;
        let id = uri_id(uri).to_string();
        debug!(%id, "created calendly webhook subscription");

        Ok(SubscriptionResult {
            status: SubscriptionStatus::Success,
            id,
            result: descriptor,
            events: params.subscription_events.clone(),
        })
    }
}

#[async_trait]
impl Webhooks for CalendlyWebhooks {
    fn allowed_events(&self, object: &str) -> &'static [SubscriptionEventType] {
        match object {
            "invitees" => &[SubscriptionEventType::Create, SubscriptionEventType::Delete],
            "routing_form_submissions" => &[SubscriptionEventType::Create],
            _ => &[],
        }
    }

    async fn subscribe(
        &self,
        hc: &HandlerContext<'_>,
        params: &SubscribeParams,
    ) -> Result<SubscriptionResult> {
        self.create(hc, params).await
    }

    /// No native update: the previous subscription is replaced
    async fn update_subscription(
        &self,
        hc: &HandlerContext<'_>,
        params: &SubscribeParams,
        previous: &SubscriptionResult,
    ) -> Result<SubscriptionResult> {
        self.delete_subscription(hc, previous).await?;
        self.create(hc, params).await
    }

    async fn delete_subscription(
        &self,
        hc: &HandlerContext<'_>,
        subscription: &SubscriptionResult,
    ) -> Result<()> {
        let mut url = hc.module_path("webhook_subscriptions")?;
        url.push_segment(uri_id(&subscription.id));
        hc.client.delete(hc.ctx, &url.to_url(), hc.headers).await?;
        Ok(())
    }

    fn verify_webhook_message(&self, request: &WebhookRequest, signing_key: &str) -> Result<bool> {
        self.verify_at(request, signing_key, Utc::now())
    }

    fn parse_events(&self, body: &[u8]) -> Result<Vec<Box<dyn SubscriptionEvent>>> {
        let raw: Value = serde_json::from_slice(body)?;
        Ok(vec![Box::new(CalendlyEvent { raw })])
    }
}

/// One Calendly delivery (`{event, created_at, created_by, payload}`)
#[derive(Debug, Clone, PartialEq)]
pub struct CalendlyEvent {
    raw: Value,
}

impl CalendlyEvent {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    fn text(&self, zoom: &[&str], key: &str) -> Result<&str> {
        Query::new(&self.raw, zoom).string_required(key)
    }
}

impl SubscriptionEvent for CalendlyEvent {
    fn event_type(&self) -> Result<SubscriptionEventType> {
        Ok(match self.text(&[], "event")? {
            "invitee.created" | "routing_form_submission.created" => SubscriptionEventType::Create,
            "invitee.canceled" => SubscriptionEventType::Delete,
            _ => SubscriptionEventType::Other,
        })
    }

    fn raw_event_name(&self) -> Result<String> {
        self.text(&[], "event").map(str::to_string)
    }

    /// `invitee.created` belongs to `invitees`
    fn object_name(&self) -> Result<String> {
        let event = self.text(&[], "event")?;
        let (object, _) = event.split_once('.').ok_or_else(|| Error::InvalidEventType {
            event: event.to_string(),
        })?;
        Ok(format!("{object}s"))
    }

    fn record_id(&self) -> Result<String> {
        self.text(&["payload"], "uri").map(|uri| uri_id(uri).to_string())
    }

    /// The user whose subscription produced the delivery
    fn workspace(&self) -> Result<String> {
        self.text(&[], "created_by").map(|uri| uri_id(uri).to_string())
    }

    fn event_timestamp_nano(&self) -> Result<i64> {
        let created = self.text(&[], "created_at")?;
        let ts = DateTime::parse_from_rfc3339(created)
            .map_err(|e| Error::missing_values(format!("created_at '{created}': {e}")))?;
        ts.timestamp_nanos_opt()
            .ok_or_else(|| Error::missing_values(format!("created_at '{created}' out of range")))
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}
