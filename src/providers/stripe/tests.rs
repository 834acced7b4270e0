//! Tests for the Stripe adapter

use super::webhooks::SIGNATURE_HEADER;
use super::*;
use crate::error::ErrorKind;
use crate::model::{
    ObjectEvents, ReadParams, SubscribeParams, SubscriptionEvent, SubscriptionEventType,
    SubscriptionRequest, SubscriptionResult, SubscriptionStatus, WebhookRequest, WriteParams,
};
use crate::providers::signature::hmac_sha256;
use crate::providers::testing::Harness;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::matchers::{
    body_string, body_string_contains, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, ResponseTemplate};

fn events(object: &str, kinds: &[SubscriptionEventType]) -> BTreeMap<String, ObjectEvents> {
    let mut map = BTreeMap::new();
    map.insert(object.to_string(), ObjectEvents::new(kinds.iter().copied()));
    map
}

fn endpoint(id: &str, enabled: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "object": "webhook_endpoint",
        "url": "https://hooks.example.com/stripe",
        "enabled_events": enabled,
        "status": "enabled"
    })
}

#[tokio::test]
async fn test_read_pages_after_last_id() {
    let h = Harness::start(ProviderName::Stripe).await;
    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .and(query_param("limit", "10"))
        .and(query_param("created[gte]", "1704067200"))
        .and(query_param_is_missing("starting_after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "cus_1", "email": "a@example.com"},
                {"id": "cus_2", "email": "b@example.com"}
            ],
            "has_more": true
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let params = ReadParams::new("customers")
        .fields(["email"])
        .since(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let page = Stripe.read(&h.hc(), &params).await.unwrap();
    assert_eq!(page.rows, 2);
    assert_eq!(page.next_page, "cus_2");

    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .and(query_param("starting_after", "cus_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": "cus_3", "email": "c@example.com"}],
            "has_more": false
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let page = Stripe
        .read(&h.hc(), &params.clone().next_page("cus_2"))
        .await
        .unwrap();
    assert_eq!(page.data[0].id, "cus_3");
    assert!(page.done);
}

#[tokio::test]
async fn test_create_is_form_encoded() {
    let h = Harness::start(ProviderName::Stripe).await;
    Mock::given(method("POST"))
        .and(path("/v1/customers"))
        .and(body_string("email=ada%40example.com&metadata%5Btier%5D=gold"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cus_9", "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let params = WriteParams::new(
        "customers",
        json!({"email": "ada@example.com", "metadata": {"tier": "gold"}}),
    );
    let result = Stripe.write(&h.hc(), &params).await.unwrap();
    assert_eq!(result.record_id, "cus_9");
}

#[tokio::test]
async fn test_update_posts_to_record() {
    let h = Harness::start(ProviderName::Stripe).await;
    Mock::given(method("POST"))
        .and(path("/v1/customers/cus_9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cus_9"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let params = WriteParams::new("customers", json!({"name": "Ada"})).record_id("cus_9");
    let result = Stripe.write(&h.hc(), &params).await.unwrap();
    assert_eq!(result.record_id, "cus_9");
}

#[tokio::test]
async fn test_error_object_keeps_message() {
    let h = Harness::start(ProviderName::Stripe).await;
    Mock::given(method("POST"))
        .and(path("/v1/charges"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Amount must be positive", "type": "invalid_request_error"}
        })))
        .mount(&h.server)
        .await;

    let err = Stripe
        .write(&h.hc(), &WriteParams::new("charges", json!({"amount": -1})))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::BadRequest));
    assert!(err.to_string().contains("invalid_request_error: Amount must be positive"));
}

#[tokio::test]
async fn test_subscribe_creates_endpoint() {
    let h = Harness::start(ProviderName::Stripe).await;
    Mock::given(method("POST"))
        .and(path("/v1/webhook_endpoints"))
        .and(body_string_contains("enabled_events%5B0%5D=customer.created"))
        .and(body_string_contains("enabled_events%5B1%5D=customer.deleted"))
        .and(body_string_contains("url=https%3A%2F%2Fhooks.example.com%2Fstripe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(endpoint(
            "we_1",
            &["customer.created", "customer.deleted"],
        )))
        .expect(1)
        .mount(&h.server)
        .await;

    let params = SubscribeParams {
        request: SubscriptionRequest {
            webhook_url: "https://hooks.example.com/stripe".to_string(),
            ..Default::default()
        },
        subscription_events: events(
            "customers",
            &[SubscriptionEventType::Create, SubscriptionEventType::Delete],
        ),
    };
    let result = StripeWebhooks.subscribe(&h.hc(), &params).await.unwrap();
    assert_eq!(result.id, "we_1");
    assert_eq!(result.status, SubscriptionStatus::Success);
}

#[tokio::test]
async fn test_subscribe_rejects_disallowed_event() {
    let h = Harness::start(ProviderName::Stripe).await;
    let params = SubscribeParams {
        request: SubscriptionRequest::default(),
        subscription_events: events("charges", &[SubscriptionEventType::Delete]),
    };
    let err = StripeWebhooks.subscribe(&h.hc(), &params).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidEventType));
}

#[tokio::test]
async fn test_partial_delete_keeps_remaining_events() {
    let h = Harness::start(ProviderName::Stripe).await;
    Mock::given(method("GET"))
        .and(path("/v1/webhook_endpoints/we_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(endpoint(
            "we_1",
            &["customer.created", "customer.updated", "product.created"],
        )))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/webhook_endpoints/we_1"))
        .and(body_string("enabled_events%5B0%5D=product.created"))
        .respond_with(ResponseTemplate::new(200).set_body_json(endpoint(
            "we_1",
            &["product.created"],
        )))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let subscription = SubscriptionResult {
        status: SubscriptionStatus::Success,
        id: "we_1".to_string(),
        result: json!({}),
        events: events(
            "customers",
            &[SubscriptionEventType::Create, SubscriptionEventType::Update],
        ),
    };
    StripeWebhooks
        .delete_subscription(&h.hc(), &subscription)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_of_last_events_removes_endpoint() {
    let h = Harness::start(ProviderName::Stripe).await;
    Mock::given(method("GET"))
        .and(path("/v1/webhook_endpoints/we_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(endpoint("we_1", &["customer.created"])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/webhook_endpoints/we_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "we_1", "deleted": true})))
        .expect(1)
        .mount(&h.server)
        .await;

    let subscription = SubscriptionResult {
        status: SubscriptionStatus::Success,
        id: "we_1".to_string(),
        result: json!({}),
        events: events("customers", &[SubscriptionEventType::Create]),
    };
    StripeWebhooks
        .delete_subscription(&h.hc(), &subscription)
        .await
        .unwrap();
}

fn signed(key: &str, timestamp: i64, body: &str) -> WebhookRequest {
    let tag = hmac_sha256(key.as_bytes(), format!("{timestamp}.{body}").as_bytes()).unwrap();
    let value = format!("t={timestamp},v1={},v0=ignored", hex::encode(&tag));

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::try_from(SIGNATURE_HEADER).unwrap(),
        HeaderValue::from_str(&value).unwrap(),
    );
    WebhookRequest {
        headers,
        body: Bytes::from(body.to_string()),
    }
}

#[test]
fn test_verify_signature() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let body = r#"{"id":"evt_1","type":"customer.created"}"#;

    let request = signed("whsec_test", now.timestamp(), body);
    assert!(StripeWebhooks.verify_at(&request, "whsec_test", now).unwrap());
    assert!(!StripeWebhooks.verify_at(&request, "whsec_other", now).unwrap());

    let stale = signed("whsec_test", now.timestamp() - 600, body);
    assert!(!StripeWebhooks.verify_at(&stale, "whsec_test", now).unwrap());
}

#[test]
fn test_verify_malformed_header() {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::try_from(SIGNATURE_HEADER).unwrap(),
        HeaderValue::from_static("v1=abcd"),
    );
    let request = WebhookRequest {
        headers,
        body: Bytes::new(),
    };
    let err = StripeWebhooks
        .verify_at(&request, "whsec_test", Utc::now())
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidSignature));
}

#[test]
fn test_parse_event() {
    let body = json!({
        "id": "evt_1",
        "object": "event",
        "type": "customer.subscription.deleted",
        "created": 1_717_200_000,
        "account": "acct_1",
        "data": {"object": {"id": "sub_1", "object": "subscription", "status": "canceled"}}
    });
    let parsed = StripeWebhooks
        .parse_events(body.to_string().as_bytes())
        .unwrap();
    let event = &parsed[0];

    assert_eq!(event.event_type().unwrap(), SubscriptionEventType::Delete);
    assert_eq!(event.raw_event_name().unwrap(), "customer.subscription.deleted");
    assert_eq!(event.object_name().unwrap(), "subscriptions");
    assert_eq!(event.record_id().unwrap(), "sub_1");
    assert_eq!(event.workspace().unwrap(), "acct_1");
    assert_eq!(event.event_timestamp_nano().unwrap(), 1_717_200_000_000_000_000);
}

#[test]
fn test_event_without_account_is_an_error() {
    let event = StripeEvent::new(json!({"type": "customer.created", "data": {"object": {}}}));
    assert!(event.workspace().is_err());
    assert!(event.record_id().is_err());
}
