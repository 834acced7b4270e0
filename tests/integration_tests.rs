//! Integration tests using mock HTTP servers
//!
//! Tests the full flow through the public API: connector → adapter →
//! handler → HTTP → uniform result.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use sha2::Sha256;
use solidafy_connectors::{
    AuthConfig, Connector, ConnectorParams, DeleteParams, ErrorKind, HttpClient, HttpClientConfig,
    ObjectEvents, PostAuthInfo, ProviderName, ReadParams, SubscribeParams, SubscriptionEventType,
    SubscriptionRequest, SubscriptionStatus, WebhookRequest, WriteParams,
};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connector(provider: ProviderName, server: &MockServer) -> Connector {
    connector_with(ConnectorParams::new(provider, http()).base_url(server.uri()))
}

fn connector_with(params: ConnectorParams) -> Connector {
    Connector::new(params).unwrap()
}

fn http() -> HttpClient {
    HttpClient::with_auth(HttpClientConfig::default(), AuthConfig::bearer("test-token")).unwrap()
}

fn calendly_post_auth() -> PostAuthInfo {
    PostAuthInfo::from_pairs([
        ("organization", "https://api.calendly.com/organizations/ORG1"),
        ("user", "https://api.calendly.com/users/U1"),
    ])
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_hubspot_contacts_default_read() {
    let server = MockServer::start().await;
    let next = format!("{}/crm/v3/objects/contacts?after=394", server.uri());
    Mock::given(method("GET"))
        .and(path("/crm/v3/objects/contacts"))
        .and(query_param("properties", "hs_object_id"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "101", "properties": {"hs_object_id": "101"}},
                {"id": "102", "properties": {"hs_object_id": "102"}},
                {"id": "103", "properties": {"hs_object_id": "103"}}
            ],
            "paging": {"next": {"after": "394", "link": next}}
        })))
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Hubspot, &server);
    let params = ReadParams::new("contacts").fields(["hs_object_id"]);
    let result = conn.read(&CancellationToken::new(), &params).await.unwrap();

    assert_eq!(result.rows, 3);
    assert_eq!(result.next_page, next);
    assert!(!result.done);
    for row in &result.data {
        assert_eq!(row.fields["hs_object_id"], json!(row.id));
    }
}

#[tokio::test]
async fn test_klaviyo_incremental_read_with_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns"))
        .and(header("revision", "2024-10-15"))
        .and(query_param(
            "filter",
            "greater-than(updated_at,2024-03-04T08:22:56Z),equals(messages.channel,'email')",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "type": "campaign",
                "id": "01JC",
                "attributes": {"name": "Email Campaign - Nov 15, 2024, 1:18 AM"}
            }],
            "links": {"next": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Klaviyo, &server);
    let params = ReadParams::new("campaigns")
        .fields(["name"])
        .since(Utc.with_ymd_and_hms(2024, 3, 4, 8, 22, 56).unwrap())
        .filter("equals(messages.channel,'email')");
    let result = conn.read(&CancellationToken::new(), &params).await.unwrap();

    assert_eq!(
        result.data[0].fields["name"],
        json!("Email Campaign - Nov 15, 2024, 1:18 AM")
    );
    assert!(result.done);
}

#[tokio::test]
async fn test_calendly_pagination() {
    let server = MockServer::start().await;
    let next = format!("{}/scheduled_events?page_token=next123", server.uri());
    Mock::given(method("GET"))
        .and(path("/scheduled_events"))
        .and(query_param(
            "organization",
            "https://api.calendly.com/organizations/ORG1",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": [{
                "uri": "https://api.calendly.com/scheduled_events/EV1",
                "name": "Intro call"
            }],
            "pagination": {"next_page": next}
        })))
        .mount(&server)
        .await;

    let conn = connector_with(
        ConnectorParams::new(ProviderName::Calendly, http())
            .base_url(server.uri())
            .post_auth_info(calendly_post_auth()),
    );
    let params = ReadParams::new("scheduled_events").fields(["name"]);
    let result = conn.read(&CancellationToken::new(), &params).await.unwrap();

    assert_eq!(result.next_page, next);
    assert!(!result.done);
    assert_eq!(result.data[0].id, "https://api.calendly.com/scheduled_events/EV1");
}

#[tokio::test]
async fn test_phoneburner_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/1/contacts"))
        .and(query_param("page_size", "100"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "http_status": 200,
            "status": "success",
            "contacts": {
                "page": 1,
                "total_pages": 1,
                "contacts": [{"contact_user_id": "30919", "first_name": "Ada"}]
            }
        })))
        .mount(&server)
        .await;

    let conn = connector(ProviderName::PhoneBurner, &server);
    let params = ReadParams::new("contacts").fields(["first_name"]);
    let result = conn.read(&CancellationToken::new(), &params).await.unwrap();

    assert!(result.done);
    assert_eq!(result.next_page, "");
    assert_eq!(result.rows, 1);
}

#[tokio::test]
async fn test_hubspot_search_cap_without_io() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Hubspot, &server);
    let params = ReadParams::new("contacts")
        .fields(["email"])
        .next_page("10000");
    let err = conn.read(&CancellationToken::new(), &params).await.unwrap_err();
    assert!(err.is(ErrorKind::ResultsLimitExceeded));
}

// ============================================================================
// Writes and deletes
// ============================================================================

#[tokio::test]
async fn test_klaviyo_write_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/campaigns"))
        .and(header("revision", "2024-10-15"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"type": "campaign", "id": "01NEW", "attributes": {"name": "Spring"}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/campaigns/01NEW"))
        .and(header("revision", "2024-10-15"))
        .and(body_partial_json(json!({"data": {"attributes": {"name": "Summer"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "campaign", "id": "01NEW", "attributes": {"name": "Summer"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Klaviyo, &server);
    let ctx = CancellationToken::new();

    let create = WriteParams::new(
        "campaigns",
        json!({"data": {"type": "campaign", "attributes": {"name": "Spring"}}}),
    );
    let created = conn.write(&ctx, &create).await.unwrap();
    assert!(created.success);
    assert_eq!(created.record_id, "01NEW");

    let update = WriteParams::new(
        "campaigns",
        json!({"data": {"type": "campaign", "id": "01NEW", "attributes": {"name": "Summer"}}}),
    )
    .record_id("01NEW");
    let updated = conn.write(&ctx, &update).await.unwrap();
    assert_eq!(updated.record_id, "01NEW");
}

#[tokio::test]
async fn test_klaviyo_delete_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tags/popular-id"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "errors": [{
                "status": 409,
                "title": "Tag Service Error",
                "detail": "Tag with name 'popular' already exists"
            }]
        })))
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Klaviyo, &server);
    let err = conn
        .delete(&CancellationToken::new(), &DeleteParams::new("tags", "popular-id"))
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::BadRequest));
    assert!(err
        .to_string()
        .contains("Tag Service Error: Tag with name 'popular' already exists"));
}

// ============================================================================
// Metadata
// ============================================================================

#[tokio::test]
async fn test_metadata_mixes_results_and_errors() {
    let server = MockServer::start().await;
    let conn = connector(ProviderName::Klaviyo, &server);

    let result = conn
        .list_object_metadata(&CancellationToken::new(), &["lists", "metrics", "nope"])
        .await
        .unwrap();

    assert!(result.result.contains_key("lists"));
    assert!(result.result.contains_key("metrics"));
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors.contains_key("nope"));
}

// ============================================================================
// Webhooks
// ============================================================================

fn calendly_delivery(key: &str, timestamp: i64, body: &str) -> WebhookRequest {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{body}").as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let mut headers = HeaderMap::new();
    headers.insert(
        "calendly-webhook-signature",
        HeaderValue::from_str(&signature).unwrap(),
    );
    headers.insert(
        "calendly-webhook-timestamp",
        HeaderValue::from_str(&timestamp.to_string()).unwrap(),
    );
    WebhookRequest {
        headers,
        body: Bytes::from(body.to_string()),
    }
}

#[tokio::test]
async fn test_calendly_webhook_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resource": {
                "uri": "https://api.calendly.com/users/U1",
                "current_organization": "https://api.calendly.com/organizations/ORG1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook_subscriptions"))
        .and(body_partial_json(json!({
            "url": "https://example.com/hook",
            "organization": "https://api.calendly.com/organizations/ORG1",
            "scope": "organization"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "resource": {
                "uri": "https://api.calendly.com/webhook_subscriptions/W1",
                "events": ["invitee.created"],
                "state": "active"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Calendly, &server);
    let params = SubscribeParams {
        request: SubscriptionRequest {
            webhook_url: "https://example.com/hook".to_string(),
            ..Default::default()
        },
        subscription_events: BTreeMap::from([(
            "invitees".to_string(),
            ObjectEvents::new([SubscriptionEventType::Create]),
        )]),
    };
    let subscription = conn.subscribe(&CancellationToken::new(), &params).await.unwrap();
    assert_eq!(subscription.status, SubscriptionStatus::Success);
    assert_eq!(subscription.id, "W1");

    let body = json!({
        "event": "invitee.created",
        "created_at": "2024-06-01T10:00:00.000000Z",
        "created_by": "https://api.calendly.com/users/U1",
        "payload": {"uri": "https://api.calendly.com/scheduled_events/EV1/invitees/INV1"}
    })
    .to_string();
    let now = Utc::now().timestamp();

    let delivery = calendly_delivery("whsec", now, &body);
    assert!(conn.verify_webhook_message(&delivery, "whsec").unwrap());
    assert!(!conn.verify_webhook_message(&delivery, "other").unwrap());

    let stale = calendly_delivery("whsec", now - 301, &body);
    assert!(!conn.verify_webhook_message(&stale, "whsec").unwrap());

    let events = conn.parse_webhook_events(body.as_bytes()).unwrap();
    assert_eq!(events[0].event_type().unwrap(), SubscriptionEventType::Create);
    assert_eq!(events[0].object_name().unwrap(), "invitees");
    assert_eq!(events[0].record_id().unwrap(), "INV1");
}
