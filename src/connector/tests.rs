//! Tests for the connector runtime and the endpoint-support registry

use super::*;
use crate::auth::AuthConfig;
use crate::error::ErrorKind;
use crate::http::{HttpClient, HttpClientConfig};
use crate::model::{
    BatchItem, BatchWriteType, ObjectEvents, SubscriptionEventType, SubscriptionRequest,
};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RULES: &[SupportRule] = &[
    SupportRule::new("contacts", Support::CRUD),
    SupportRule::new("{deals, tickets}", Support::READ_ONLY),
    SupportRule::new("*", Support::READ),
];

fn client() -> HttpClient {
    HttpClient::with_auth(HttpClientConfig::default(), AuthConfig::bearer("tok")).unwrap()
}

fn connector(provider: ProviderName, server: &MockServer) -> Connector {
    Connector::new(ConnectorParams::new(provider, client()).base_url(server.uri())).unwrap()
}

/// Mock server that fails the test if any request reaches it
async fn silent_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    server
}

#[test_case("contacts", Operation::Delete, true)]
#[test_case("deals", Operation::Metadata, true)]
#[test_case("tickets", Operation::Write, false)]
#[test_case("owners", Operation::Read, true)]
#[test_case("owners", Operation::Metadata, false)]
fn test_first_match_support(object: &str, op: Operation, expected: bool) {
    let support = EndpointSupport::new(RULES);
    assert_eq!(support.supports(object, op), expected);
}

#[test]
fn test_unmatched_object_supports_nothing() {
    const NARROW: &[SupportRule] = &[SupportRule::new("{a,b}", Support::READ)];
    let support = EndpointSupport::new(NARROW);
    assert_eq!(support.support_for("c"), Support::NONE);
    assert_eq!(support.object_names(), vec!["a", "b"]);
}

#[test]
fn test_support_flags() {
    let flags = Support::READ | Support::WRITE;
    assert!(flags.supports(Operation::Write));
    assert!(!flags.supports(Operation::Delete));
    assert!(Support::CRUD.contains(Support::READ_ONLY));
    assert_eq!(format!("{:?}", Support::READ_ONLY), r#"{"read", "metadata"}"#);
}

#[test]
fn test_default_module_and_urls() {
    let conn = Connector::new(ConnectorParams::new(ProviderName::Hubspot, client())).unwrap();
    assert_eq!(conn.module(), "crm");
    assert_eq!(conn.base_url(), "https://api.hubapi.com");
    assert!(conn.supports("contacts", Operation::BatchWrite));

    let mut conn = conn;
    conn.set_base_url("http://localhost:9999/");
    assert_eq!(conn.base_url(), "http://localhost:9999/");
    assert!(format!("{conn:?}").contains("http://localhost:9999/crm/v3"));
}

#[test]
fn test_unknown_module_rejected() {
    let params = ConnectorParams::new(ProviderName::Klaviyo, client()).module("2019-01-01");
    let err = Connector::new(params).unwrap_err();
    assert!(err.is(ErrorKind::UnknownModule));
}

#[test]
fn test_required_metadata() {
    let err = Connector::new(ConnectorParams::new(ProviderName::Loxo, client())).unwrap_err();
    assert!(matches!(err, Error::MissingMetadata { ref key } if key == "agencySlug"));

    let params = ConnectorParams::new(ProviderName::Loxo, client()).metadata("agencySlug", "acme");
    assert!(Connector::new(params).is_ok());
}

#[test]
fn test_workspace_exposed_as_metadata() {
    let params = ConnectorParams::new(ProviderName::Slack, client())
        .workspace("T123")
        .metadata("other", "x");
    let metadata = params.resolved_metadata();
    assert_eq!(metadata.get(WORKSPACE_KEY).map(String::as_str), Some("T123"));

    let explicit = params.metadata(WORKSPACE_KEY, "T999").resolved_metadata();
    assert_eq!(explicit.get(WORKSPACE_KEY).map(String::as_str), Some("T999"));
}

#[tokio::test]
async fn test_validation_precedes_io() {
    let server = silent_server().await;
    let conn = connector(ProviderName::PhoneBurner, &server);
    let ctx = CancellationToken::new();

    let err = conn.read(&ctx, &ReadParams::new("")).await.unwrap_err();
    assert!(err.is(ErrorKind::MissingObjects));

    let err = conn.read(&ctx, &ReadParams::new("contacts")).await.unwrap_err();
    assert!(err.is(ErrorKind::MissingFields));

    let params = ReadParams::new("contacts").fields(["first_name"]).next_page("abc");
    let err = conn.read(&ctx, &params).await.unwrap_err();
    assert!(err.is(ErrorKind::NextPageInvalid));

    let err = conn
        .delete(&ctx, &DeleteParams::new("contacts", ""))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::MissingRecordId));

    let err = conn
        .write(&ctx, &WriteParams::new("contacts", Value::Null))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::MissingRecordData));
}

#[tokio::test]
async fn test_unsupported_operation() {
    let server = silent_server().await;
    let conn = connector(ProviderName::Klaviyo, &server);
    let ctx = CancellationToken::new();

    let err = conn
        .delete(&ctx, &DeleteParams::new("metrics", "m1"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::OperationNotSupported));

    let params = BatchWriteParams {
        object_name: "campaigns".to_string(),
        batch_type: BatchWriteType::Create,
        items: vec![BatchItem {
            record_id: None,
            record: json!({"name": "x"}),
            associations: None,
        }],
    };
    let err = conn.batch_write(&ctx, &params).await.unwrap_err();
    assert!(err.is(ErrorKind::OperationNotSupported));

    let count = RecordCountParams {
        object_name: "campaigns".to_string(),
        ..Default::default()
    };
    let err = conn.get_record_count(&ctx, &count).await.unwrap_err();
    assert!(err.is(ErrorKind::OperationNotSupported));
}

#[tokio::test]
async fn test_provider_read_checks_run_first() {
    let server = silent_server().await;
    let conn = Connector::new(
        ConnectorParams::new(ProviderName::Xero, client())
            .base_url(server.uri())
            .metadata("tenantId", "org-1"),
    )
    .unwrap();

    let params = ReadParams::new("invoices")
        .fields(["InvoiceID"])
        .until(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    let err = conn.read(&CancellationToken::new(), &params).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidParams));
}

#[tokio::test]
async fn test_metadata_fan_out() {
    let server = silent_server().await;
    let conn = connector(ProviderName::Klaviyo, &server);

    let result = conn
        .list_object_metadata(&CancellationToken::new(), &["campaigns", "tags", "unicorns"])
        .await
        .unwrap();

    assert_eq!(result.result.len(), 2);
    assert_eq!(result.result["campaigns"].display_name, "Campaigns");
    assert!(result.result["tags"].fields.contains_key("name"));
    assert!(result.errors["unicorns"].is(ErrorKind::OperationNotSupported));
}

#[tokio::test]
async fn test_metadata_needs_objects() {
    let server = silent_server().await;
    let conn = connector(ProviderName::Klaviyo, &server);
    let err = conn
        .list_object_metadata(&CancellationToken::new(), &[])
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::MissingObjects));
}

async fn mount_calendly_me(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resource": {
                "uri": "https://api.calendly.com/users/U1",
                "current_organization": "https://api.calendly.com/organizations/ORG1"
            }
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_calendly_event_types(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/event_types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": [{"uri": "https://api.calendly.com/event_types/E1", "name": "Intro"}],
            "pagination": {"next_page": null}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_post_auth_discovered_once() {
    let server = MockServer::start().await;
    mount_calendly_me(&server, 1).await;
    mount_calendly_event_types(&server).await;

    let conn = connector(ProviderName::Calendly, &server);
    let ctx = CancellationToken::new();
    let params = ReadParams::new("event_types").fields(["name"]);

    let first = conn.read(&ctx, &params).await.unwrap();
    let second = conn.read(&ctx, &params).await.unwrap();
    assert_eq!(first.data[0].fields["name"], json!("Intro"));
    assert_eq!(first.data, second.data);
    assert!(first.done);

    let info = conn.get_post_auth_info(&ctx).await.unwrap();
    assert_eq!(
        info.get("organization").unwrap(),
        "https://api.calendly.com/organizations/ORG1"
    );
}

#[tokio::test]
async fn test_known_post_auth_skips_discovery() {
    let server = MockServer::start().await;
    mount_calendly_me(&server, 0).await;
    mount_calendly_event_types(&server).await;

    let info = PostAuthInfo::from_pairs([
        ("organization", "https://api.calendly.com/organizations/ORG1"),
        ("user", "https://api.calendly.com/users/U1"),
    ]);
    let conn = Connector::new(
        ConnectorParams::new(ProviderName::Calendly, client())
            .base_url(server.uri())
            .post_auth_info(info),
    )
    .unwrap();

    let params = ReadParams::new("event_types").fields(["name"]);
    let result = conn.read(&CancellationToken::new(), &params).await.unwrap();
    assert_eq!(result.rows, 1);
}

#[tokio::test]
async fn test_common_headers_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(header("revision", "2024-10-15"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "t1", "type": "tag", "attributes": {"name": "vip"}}],
            "links": {"next": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Klaviyo, &server);
    let params = ReadParams::new("tags").fields(["name"]);
    let result = conn.read(&CancellationToken::new(), &params).await.unwrap();
    assert_eq!(result.data[0].fields["name"], json!("vip"));
}

#[tokio::test]
async fn test_cancelled_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [], "links": {}}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let conn = connector(ProviderName::Klaviyo, &server);
    let ctx = CancellationToken::new();
    ctx.cancel();

    let params = ReadParams::new("tags").fields(["name"]);
    let err = conn.read(&ctx, &params).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

fn subscription(object: &str, events: &[SubscriptionEventType]) -> SubscribeParams {
    SubscribeParams {
        request: SubscriptionRequest {
            webhook_url: "https://example.com/hook".to_string(),
            ..Default::default()
        },
        subscription_events: BTreeMap::from([(
            object.to_string(),
            ObjectEvents::new(events.iter().copied()),
        )]),
    }
}

#[tokio::test]
async fn test_subscribe_checks_events_before_io() {
    let server = silent_server().await;
    let conn = connector(ProviderName::Calendly, &server);
    let ctx = CancellationToken::new();

    let params = subscription("routing_form_submissions", &[SubscriptionEventType::Delete]);
    let err = conn.subscribe(&ctx, &params).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidEventType));

    let mut params = subscription("invitees", &[SubscriptionEventType::Create]);
    params.request.webhook_url.clear();
    let err = conn.subscribe(&ctx, &params).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidParams));

    let params = SubscribeParams {
        subscription_events: BTreeMap::new(),
        ..subscription("invitees", &[])
    };
    let err = conn.subscribe(&ctx, &params).await.unwrap_err();
    assert!(err.is(ErrorKind::MissingObjects));
}

#[tokio::test]
async fn test_webhooks_absent() {
    let server = silent_server().await;
    let conn = connector(ProviderName::Klaviyo, &server);

    let err = conn
        .verify_webhook_message(&WebhookRequest::default(), "secret")
        .unwrap_err();
    assert!(err.is(ErrorKind::OperationNotSupported));

    let params = subscription("campaigns", &[SubscriptionEventType::Create]);
    let err = conn
        .subscribe(&CancellationToken::new(), &params)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::OperationNotSupported));
}

#[tokio::test]
async fn test_hubspot_verify_without_subscribe() {
    let server = silent_server().await;
    let conn = connector(ProviderName::Hubspot, &server);

    let params = subscription("contacts", &[SubscriptionEventType::Create]);
    let err = conn
        .subscribe(&CancellationToken::new(), &params)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::OperationNotSupported));

    let body = br#"[{"subscriptionType":"contact.creation","objectId":1,"portalId":7,"occurredAt":1700000000000,"eventId":3}]"#;
    let events = conn.parse_webhook_events(body).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].object_name().unwrap(), "contacts");
}

#[test_case(ProviderName::Hubspot, Entity::Object, "Contact", "contacts")]
#[test_case(ProviderName::Hubspot, Entity::Field, "FirstName", "firstname")]
#[test_case(ProviderName::Calendly, Entity::Object, "ScheduledEvents", "scheduled_events")]
fn test_normalize_entity_name(provider: ProviderName, entity: Entity, input: &str, expected: &str) {
    let conn = Connector::new(ConnectorParams::new(provider, client())).unwrap();
    assert_eq!(conn.normalize_entity_name(entity, input).unwrap(), expected);
}

#[test]
fn test_normalize_empty_name() {
    let conn = Connector::new(ConnectorParams::new(ProviderName::Slack, client())).unwrap();
    let err = conn.normalize_entity_name(Entity::Object, "  ").unwrap_err();
    assert!(err.is(ErrorKind::InvalidParams));
}
