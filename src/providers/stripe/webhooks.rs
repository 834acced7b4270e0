//! Stripe webhook endpoints, signatures and events

use crate::error::{Error, Result};
use crate::handlers::HandlerContext;
use crate::http::HttpRequest;
use crate::jsonquery::Query;
use crate::model::{
    ObjectEvents, SubscribeParams, SubscriptionEvent, SubscriptionEventType, SubscriptionResult,
    SubscriptionStatus, WebhookRequest,
};
use crate::providers::signature::{header_str, verify_hmac_sha256};
use crate::providers::Webhooks;
use crate::types::Method;
use crate::urlbuilder::form_pairs;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub(crate) const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Oldest accepted delivery, in seconds
const TOLERANCE: i64 = 300;

const ALL: &[SubscriptionEventType] = &[
    SubscriptionEventType::Create,
    SubscriptionEventType::Update,
    SubscriptionEventType::Delete,
];

/// Event name prefix of an object
fn event_prefix(object: &str) -> Option<&'static str> {
    Some(match object {
        "customers" => "customer",
        "products" => "product",
        "prices" => "price",
        "coupons" => "coupon",
        "plans" => "plan",
        "invoices" => "invoice",
        "subscriptions" => "customer.subscription",
        "charges" => "charge",
        "payment_intents" => "payment_intent",
        _ => return None,
    })
}

/// Object name of a Stripe `object` kind (`customer` -> `customers`)
fn object_of_kind(kind: &str) -> String {
    format!("{kind}s")
}

fn verb(event: SubscriptionEventType) -> Option<&'static str> {
    match event {
        SubscriptionEventType::Create => Some("created"),
        SubscriptionEventType::Update => Some("updated"),
        SubscriptionEventType::Delete => Some("deleted"),
        SubscriptionEventType::Other => None,
    }
}

/// Stripe event names of the requested events, passthrough names included
fn event_names(events: &BTreeMap<String, ObjectEvents>) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for (object, requested) in events {
        let allowed = StripeWebhooks.allowed_events(object);
        for event in &requested.events {
            let invalid = || Error::InvalidEventType {
                event: format!("{object}.{event}"),
            };
            if !allowed.contains(event) {
                return Err(invalid());
            }
            let prefix = event_prefix(object).ok_or_else(invalid)?;
            let action = verb(*event).ok_or_else(invalid)?;
            names.insert(format!("{prefix}.{action}"));
        }
        names.extend(requested.passthrough_events.iter().cloned());
    }
    Ok(names)
}

/// Enabled events of an endpoint descriptor
fn enabled_events(endpoint: &Value) -> Result<BTreeSet<String>> {
    Ok(Query::new(endpoint, &[])
        .array_required("enabled_events")?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// Stripe webhook endpoint lifecycle
#[derive(Debug, Clone, Copy, Default)]
pub struct StripeWebhooks;

impl StripeWebhooks {
    /// Verify a delivery against a fixed clock
    pub fn verify_at(
        &self,
        request: &WebhookRequest,
        signing_key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let header = header_str(&request.headers, SIGNATURE_HEADER)?;

        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", t)) => timestamp = Some(t),
                Some(("v1", sig)) => signatures.push(sig),
                _ => {}
            }
        }
        let timestamp = timestamp.ok_or_else(|| Error::InvalidSignature {
            message: "no timestamp in Stripe-Signature".to_string(),
        })?;
        if signatures.is_empty() {
            return Err(Error::InvalidSignature {
                message: "no v1 signature in Stripe-Signature".to_string(),
            });
        }

        let sent_at: i64 = timestamp.parse().map_err(|_| Error::InvalidSignature {
            message: format!("malformed timestamp '{timestamp}'"),
        })?;
        if now.timestamp() - sent_at > TOLERANCE {
            debug!(sent_at, "stale stripe webhook delivery");
            return Ok(false);
        }

        let mut payload = Vec::with_capacity(timestamp.len() + 1 + request.body.len());
        payload.extend_from_slice(timestamp.as_bytes());
        payload.push(b'.');
        payload.extend_from_slice(&request.body);

        for signature in signatures {
            let Ok(tag) = hex::decode(signature) else {
                continue;
            };
            if verify_hmac_sha256(signing_key.as_bytes(), &payload, &tag)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// POST an endpoint descriptor (create, or update when `id` is set)
    async fn save_endpoint(
        &self,
        hc: &HandlerContext<'_>,
        id: Option<&str>,
        url: Option<&str>,
        events: &BTreeSet<String>,
        description: Option<&str>,
    ) -> Result<Value> {
        let mut body = json!({ "enabled_events": events });
        if let Some(url) = url {
            body["url"] = json!(url);
        }
        if let Some(description) = description {
            body["description"] = json!(description);
        }

        let mut endpoint = hc.module_path("webhook_endpoints")?;
        if let Some(id) = id {
            endpoint.push_segment(id);
        }
        let request = HttpRequest::new(Method::POST, &endpoint)
            .headers(hc.headers)
            .form(form_pairs(&body)?);
        let response = hc.client.send(hc.ctx, request).await?;
        Ok(response.require_body()?.clone())
    }

    async fn delete_endpoint(&self, hc: &HandlerContext<'_>, id: &str) -> Result<()> {
        let mut url = hc.module_path("webhook_endpoints")?;
        url.push_segment(id);
        hc.client.delete(hc.ctx, &url.to_url(), hc.headers).await?;
        debug!(id, "deleted stripe webhook endpoint");
        Ok(())
    }
}

fn subscription(descriptor: Value, events: BTreeMap<String, ObjectEvents>) -> Result<SubscriptionResult> {
    let id = Query::new(&descriptor, &[]).string_required("id")?.to_string();
    let status = match descriptor.get("status").and_then(Value::as_str) {
        Some("disabled") => SubscriptionStatus::Failed,
        _ => SubscriptionStatus::Success,
    };
    Ok(SubscriptionResult {
        status,
        id,
        result: descriptor,
        events,
    })
}

#[async_trait]
impl Webhooks for StripeWebhooks {
    fn allowed_events(&self, object: &str) -> &'static [SubscriptionEventType] {
        match object {
            "charges" => &[SubscriptionEventType::Update],
            "payment_intents" => &[SubscriptionEventType::Create],
            _ if event_prefix(object).is_some() => ALL,
            _ => &[],
        }
    }

    async fn subscribe(
        &self,
        hc: &HandlerContext<'_>,
        params: &SubscribeParams,
    ) -> Result<SubscriptionResult> {
        let names = event_names(&params.subscription_events)?;
        let request = &params.request;
        let descriptor = self
            .save_endpoint(
                hc,
                None,
                Some(request.webhook_url.as_str()),
                &names,
                request.description.as_deref(),
            )
            .await?;
        subscription(descriptor, params.subscription_events.clone())
    }

    /// Replace the endpoint's enabled events (and URL)
    async fn update_subscription(
        &self,
        hc: &HandlerContext<'_>,
        params: &SubscribeParams,
        previous: &SubscriptionResult,
    ) -> Result<SubscriptionResult> {
        let names = event_names(&params.subscription_events)?;
        let request = &params.request;
        let url = Some(request.webhook_url.as_str()).filter(|u| !u.is_empty());
        let descriptor = self
            .save_endpoint(
                hc,
                Some(previous.id.as_str()),
                url,
                &names,
                request.description.as_deref(),
            )
            .await?;
        subscription(descriptor, params.subscription_events.clone())
    }

    /// Remove the named events; the endpoint goes away once none are left
    async fn delete_subscription(
        &self,
        hc: &HandlerContext<'_>,
        subscription: &SubscriptionResult,
    ) -> Result<()> {
        if subscription.events.is_empty() {
            return self.delete_endpoint(hc, &subscription.id).await;
        }

        let remove = event_names(&subscription.events)?;
        let mut url = hc.module_path("webhook_endpoints")?;
        url.push_segment(&subscription.id);
        let response = hc.client.get(hc.ctx, &url.to_url(), hc.headers).await?;
        let current = enabled_events(response.require_body()?)?;

        let remaining: BTreeSet<String> = current.difference(&remove).cloned().collect();
        if remaining.is_empty() {
            return self.delete_endpoint(hc, &subscription.id).await;
        }
        self.save_endpoint(hc, Some(subscription.id.as_str()), None, &remaining, None)
            .await?;
        Ok(())
    }

    fn verify_webhook_message(&self, request: &WebhookRequest, signing_key: &str) -> Result<bool> {
        self.verify_at(request, signing_key, Utc::now())
    }

    fn parse_events(&self, body: &[u8]) -> Result<Vec<Box<dyn SubscriptionEvent>>> {
        let raw: Value = serde_json::from_slice(body)?;
        Ok(vec![Box::new(StripeEvent { raw })])
    }
}

/// One Stripe `event` object
#[derive(Debug, Clone, PartialEq)]
pub struct StripeEvent {
    raw: Value,
}

impl StripeEvent {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    fn event_name(&self) -> Result<&str> {
        Query::new(&self.raw, &[]).string_required("type")
    }
}

impl SubscriptionEvent for StripeEvent {
    fn event_type(&self) -> Result<SubscriptionEventType> {
        let name = self.event_name()?;
        Ok(match name.rsplit('.').next() {
            Some("created") => SubscriptionEventType::Create,
            Some("updated") => SubscriptionEventType::Update,
            Some("deleted") => SubscriptionEventType::Delete,
            _ => SubscriptionEventType::Other,
        })
    }

    fn raw_event_name(&self) -> Result<String> {
        self.event_name().map(str::to_string)
    }

    fn object_name(&self) -> Result<String> {
        let kind = Query::new(&self.raw, &["data", "object"]).string_required("object")?;
        Ok(object_of_kind(kind))
    }

    fn record_id(&self) -> Result<String> {
        Query::new(&self.raw, &["data", "object"])
            .string_required("id")
            .map(str::to_string)
    }

    /// Connected account the event belongs to
    fn workspace(&self) -> Result<String> {
        Query::new(&self.raw, &[])
            .string_required("account")
            .map(str::to_string)
    }

    fn event_timestamp_nano(&self) -> Result<i64> {
        let created = Query::new(&self.raw, &[]).integer_required("created")?;
        created
            .checked_mul(1_000_000_000)
            .ok_or_else(|| Error::missing_values(format!("created {created} out of range")))
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}
