//! Tests for the catalog, provider names and the table-driven adapters

use super::testing::Harness;
use super::*;
use crate::error::{ApiErrorKind, ErrorKind};
use crate::model::{Entity, Operation, ReadParams, WriteParams};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{body_partial_json, body_string, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_catalog_covers_every_provider() {
    let names = provider_names();
    assert_eq!(names.len(), ProviderName::ALL.len());
    for provider in ProviderName::ALL {
        let info = provider_info(provider.as_str()).unwrap();
        assert_eq!(info.name, provider.as_str());
        let (module, _) = info.module(None).unwrap();
        assert_eq!(module, info.default_module);
    }
}

#[test]
fn test_catalog_modules() {
    let info = provider_info("hubspot").unwrap();
    let (id, module) = info.module(Some("crm")).unwrap();
    assert_eq!(id, "crm");
    assert_eq!(module.path, "crm/v3");
    assert_eq!(info.module_base_url(module), "https://api.hubapi.com");

    let err = info.module(Some("marketing")).unwrap_err();
    assert!(err.is(ErrorKind::UnknownModule));
    assert!(provider_info("salesforce").unwrap_err().is(ErrorKind::UnknownProvider));
}

#[test_case("https://api.hubapi.com", "crm/v3", "https://api.hubapi.com/crm/v3")]
#[test_case("https://api.hubapi.com/", "/crm/v3/", "https://api.hubapi.com/crm/v3")]
#[test_case("https://api.calendly.com", "", "https://api.calendly.com")]
fn test_join_module_url(base: &str, path: &str, expected: &str) {
    assert_eq!(join_module_url(base, path), expected);
}

#[test_case("hubspot", ProviderName::Hubspot)]
#[test_case("HubSpot", ProviderName::Hubspot)]
#[test_case(" snapchatads ", ProviderName::SnapchatAds)]
#[test_case("RingCentral", ProviderName::RingCentral)]
fn test_provider_name_from_str(input: &str, expected: ProviderName) {
    assert_eq!(input.parse::<ProviderName>().unwrap(), expected);
}

#[test]
fn test_provider_name_round_trip() {
    for provider in ProviderName::ALL {
        assert_eq!(provider.to_string().parse::<ProviderName>().unwrap(), provider);
        assert_eq!(provider.adapter().name(), provider);
    }
    assert!("pipedrive".parse::<ProviderName>().unwrap_err().is(ErrorKind::UnknownProvider));
}

#[test_case("ScheduledEvents", "scheduled_events")]
#[test_case("scheduled-events", "scheduled_events")]
#[test_case("  Call Log ", "call_log")]
#[test_case("users", "users")]
#[test_case("v1Teams", "v1_teams")]
fn test_snake_case(input: &str, expected: &str) {
    assert_eq!(snake_case(input), expected);
}

#[test]
fn test_default_normalization() {
    let adapter = ProviderName::Calendly.adapter();
    assert_eq!(adapter.normalize_entity_name(Entity::Object, "RoutingForms"), "routing_forms");
    assert_eq!(adapter.normalize_entity_name(Entity::Field, "Name"), "Name");
}

#[test]
fn test_schema_spec() {
    let spec = schema_spec(ProviderName::PhoneBurner, "root", "dialsession").unwrap();
    assert_eq!(spec.name, "Dial Sessions");
    assert_eq!(spec.path, "dialsession");

    let err = schema_spec(ProviderName::PhoneBurner, "root", "voicemails").unwrap_err();
    assert!(err.is(ErrorKind::ObjectNotFound));
    assert!(schema_spec(ProviderName::Slack, "root", "users").is_err());
}

#[test]
fn test_unknown_objects() {
    for provider in ProviderName::ALL {
        let adapter = provider.adapter();
        let info = provider_info(provider.as_str()).unwrap();
        let err = adapter.object_spec(&info.default_module, "no_such_object").unwrap_err();
        assert!(err.is(ErrorKind::ObjectNotFound), "{provider}");
    }
}

#[test]
fn test_supported_objects_have_specs() {
    for provider in ProviderName::ALL {
        let adapter = provider.adapter();
        let info = provider_info(provider.as_str()).unwrap();
        let support = adapter.support(&info.default_module);
        for object in support.object_names() {
            if !support.supports(object, Operation::Read) {
                continue;
            }
            assert!(
                adapter.object_spec(&info.default_module, object).is_ok(),
                "{provider}/{object}"
            );
        }
    }
}

#[tokio::test]
async fn test_klaviyo_read_sends_revision() {
    let h = Harness::start(ProviderName::Klaviyo).await;
    let next = format!("{}/api/profiles?page%5Bcursor%5D=abc", h.server.uri());
    Mock::given(method("GET"))
        .and(path("/api/profiles"))
        .and(header("revision", "2024-10-15"))
        .and(query_param("page[size]", "100"))
        .and(query_param("filter", "greater-than(updated,2024-01-01T00:00:00Z)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "type": "profile",
                "id": "01HX",
                "attributes": {"email": "ada@example.com", "first_name": "Ada"}
            }],
            "links": {"next": next}
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("profiles")
        .fields(["email"])
        .since(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();

    assert_eq!(result.data[0].id, "01HX");
    assert_eq!(result.data[0].fields["email"], json!("ada@example.com"));
    assert_eq!(result.data[0].raw["attributes"]["first_name"], json!("Ada"));
    assert_eq!(result.next_page, next);
}

#[tokio::test]
async fn test_klaviyo_errors_array() {
    let h = Harness::start(ProviderName::Klaviyo).await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"status": 400, "code": "invalid", "detail": "filter is required"}]
        })))
        .mount(&h.server)
        .await;

    let err = h.adapter.read(&h.hc(), &ReadParams::new("campaigns")).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(ApiErrorKind::BadRequest));
}

#[tokio::test]
async fn test_phoneburner_contacts_single_page() {
    let h = Harness::start(ProviderName::PhoneBurner).await;
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
                "contacts": [{
                    "contact_user_id": "30919",
                    "first_name": "Ada",
                    "custom_fields": [{"name": "Lead Tier", "type": 1, "value": "gold"}]
                }]
            }
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("contacts").fields(["first_name", "lead_tier"]);
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();

    assert!(result.done);
    assert_eq!(result.next_page, "");
    assert_eq!(result.data[0].id, "30919");
    assert_eq!(result.data[0].fields["lead_tier"], json!("gold"));
    assert_eq!(result.data[0].fields["first_name"], json!("Ada"));
}

#[tokio::test]
async fn test_phoneburner_envelope_failure() {
    let h = Harness::start(ProviderName::PhoneBurner).await;
    Mock::given(method("GET"))
        .and(path("/rest/1/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "http_status": 401,
            "status": "error",
            "message": "Invalid access token"
        })))
        .mount(&h.server)
        .await;

    let err = h.adapter.read(&h.hc(), &ReadParams::new("members")).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(ApiErrorKind::AccessToken));
    assert!(err.to_string().contains("Invalid access token"));
}

#[tokio::test]
async fn test_phoneburner_folder_form_write() {
    let h = Harness::start(ProviderName::PhoneBurner).await;
    Mock::given(method("POST"))
        .and(path("/rest/1/folders"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("folder_name=Leads"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "http_status": 201,
            "folders": {"812": {"folder_id": 812, "folder_name": "Leads"}}
        })))
        .mount(&h.server)
        .await;

    let params = WriteParams::new("folders", json!({"folder_name": "Leads"}));
    let result = h.adapter.write(&h.hc(), &params).await.unwrap();
    assert_eq!(result.record_id, "812");
}

#[tokio::test]
async fn test_slack_envelope_error() {
    let h = Harness::start(ProviderName::Slack).await;
    Mock::given(method("GET"))
        .and(path("/users.list"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": false, "error": "invalid_auth"})),
        )
        .mount(&h.server)
        .await;

    let err = h.adapter.read(&h.hc(), &ReadParams::new("users")).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(ApiErrorKind::AccessToken));
}

#[tokio::test]
async fn test_slack_cursor_paging() {
    let h = Harness::start(ProviderName::Slack).await;
    Mock::given(method("GET"))
        .and(path("/conversations.list"))
        .and(query_param("cursor", "dGVhbTpDMDYx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "channels": [{"id": "C061", "name": "general"}],
            "response_metadata": {"next_cursor": ""}
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("channels").fields(["name"]).next_page("dGVhbTpDMDYx");
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.data[0].id, "C061");
    assert!(result.done);
}

#[tokio::test]
async fn test_slack_post_auth_and_lookup() {
    let h = Harness::start(ProviderName::Slack).await;
    Mock::given(method("GET"))
        .and(path("/auth.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "team_id": "T1", "user_id": "U1", "team": "Acme"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users.info"))
        .and(query_param("user", "U2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "user": {"id": "U2", "Name": "grace"}
        })))
        .mount(&h.server)
        .await;

    let info = h.adapter.post_auth_info(&h.hc()).await.unwrap();
    assert_eq!(info.get("team_id").unwrap(), "T1");

    let row = h.adapter.get_record(&h.hc(), "users", "U2").await.unwrap();
    assert_eq!(row.id, "U2");
    assert_eq!(row.fields["name"], json!("grace"));
}

#[tokio::test]
async fn test_xero_tenant_discovery_and_header() {
    let h = Harness::start(ProviderName::Xero).await;
    assert!(h.adapter.requires_post_auth(&h.metadata));
    Mock::given(method("GET"))
        .and(path("/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"tenantId": "practice-1", "tenantType": "PRACTICEMANAGER"},
            {"tenantId": "org-1", "tenantType": "ORGANISATION"}
        ])))
        .mount(&h.server)
        .await;

    let info = h.adapter.post_auth_info(&h.hc()).await.unwrap();
    assert_eq!(info.get("tenantId").unwrap(), "org-1");

    let h = h.with_post_auth([("tenantId", "org-1")]);
    assert_eq!(h.headers.get("xero-tenant-id"), Some("org-1"));
    Mock::given(method("GET"))
        .and(path("/api.xro/2.0/Invoices"))
        .and(header("Xero-Tenant-Id", "org-1"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"page": 1, "pageSize": 100, "pageCount": 3, "itemCount": 250},
            "Invoices": [{"InvoiceID": "inv-1", "Total": 10.5}]
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("invoices")
        .fields(["Total"])
        .since(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.data[0].id, "inv-1");
    assert_eq!(result.data[0].fields["total"], json!(10.5));
    assert_eq!(result.next_page, "2");

    let received = h.server.received_requests().await.unwrap();
    let invoices = received
        .iter()
        .find(|r| r.url.path() == "/api.xro/2.0/Invoices")
        .unwrap();
    assert_eq!(
        invoices.headers.get("if-modified-since").unwrap(),
        "Mon, 01 Jan 2024 00:00:00 GMT"
    );
}

#[tokio::test]
async fn test_xero_metadata_tenant_skips_discovery() {
    let h = Harness::start(ProviderName::Xero)
        .await
        .with_metadata("tenantId", "org-9");
    assert!(!h.adapter.requires_post_auth(&h.metadata));
    assert_eq!(h.headers.get("Xero-Tenant-Id"), Some("org-9"));
}

#[tokio::test]
async fn test_xero_write_wraps_array() {
    let h = Harness::start(ProviderName::Xero)
        .await
        .with_metadata("tenantId", "org-1");
    Mock::given(method("POST"))
        .and(path("/api.xro/2.0/Contacts"))
        .and(body_partial_json(json!({"Contacts": [{"Name": "Initech"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Contacts": [{"ContactID": "c-1", "Name": "Initech"}]
        })))
        .mount(&h.server)
        .await;

    let params = WriteParams::new("contacts", json!({"Name": "Initech"}));
    let result = h.adapter.write(&h.hc(), &params).await.unwrap();
    assert_eq!(result.record_id, "c-1");
}

#[tokio::test]
async fn test_xero_validation_message() {
    let h = Harness::start(ProviderName::Xero)
        .await
        .with_metadata("tenantId", "org-1");
    Mock::given(method("POST"))
        .and(path("/api.xro/2.0/Invoices"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ErrorNumber": 10,
            "Type": "ValidationException",
            "Message": "A validation exception occurred",
            "Elements": [{"ValidationErrors": [{"Message": "Contact is required"}]}]
        })))
        .mount(&h.server)
        .await;

    let params = WriteParams::new("invoices", json!({"Type": "ACCREC"}));
    let err = h.adapter.write(&h.hc(), &params).await.unwrap_err();
    assert!(err.to_string().contains("Contact is required"));
}

#[test]
fn test_xero_until_needs_since() {
    let adapter = ProviderName::Xero.adapter();
    let until = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let params = ReadParams::new("invoices").until(until);
    let err = adapter.validate_read("accounting", &params).unwrap_err();
    assert!(err.is(ErrorKind::InvalidParams));

    let params = params.since(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert!(adapter.validate_read("accounting", &params).is_ok());
}

#[tokio::test]
async fn test_snapchat_unwraps_items() {
    let h = Harness::start(ProviderName::SnapchatAds)
        .await
        .with_post_auth([("organizationId", "org-7")]);
    Mock::given(method("GET"))
        .and(path("/v1/organizations/org-7/adaccounts"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_status": "SUCCESS",
            "adaccounts": [
                {"sub_request_status": "SUCCESS", "adaccount": {"id": "a-1", "name": "Main"}},
                {"sub_request_status": "SUCCESS", "adaccount": {"id": "a-2", "name": "Test"}}
            ],
            "paging": {}
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("adaccounts").fields(["name"]);
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.rows, 2);
    assert_eq!(result.data[1].id, "a-2");
    assert_eq!(result.data[0].fields["name"], json!("Main"));
    assert!(result.done);
}

#[tokio::test]
async fn test_snapchat_requires_organization() {
    let h = Harness::start(ProviderName::SnapchatAds).await;
    assert!(h.adapter.requires_post_auth(&h.metadata));
    let err = h.adapter.read(&h.hc(), &ReadParams::new("roles")).await.unwrap_err();
    assert!(err.is(ErrorKind::MissingPostAuthInfo));

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_status": "SUCCESS",
            "me": {"id": "u-1", "organization_id": "org-7"}
        })))
        .mount(&h.server)
        .await;
    let info = h.adapter.post_auth_info(&h.hc()).await.unwrap();
    assert_eq!(info.get("organizationId").unwrap(), "org-7");
}

#[tokio::test]
async fn test_loxo_agency_path() {
    let h = Harness::start(ProviderName::Loxo)
        .await
        .with_metadata("agencySlug", "acme");
    Mock::given(method("GET"))
        .and(path("/acme/people"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "people": [{"id": 1, "name": "Ada"}],
            "scroll_id": "scroll-2"
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("people").fields(["name"]);
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.data[0].id, "1");
    assert_eq!(result.next_page, "scroll-2");

    assert_eq!(h.adapter.required_metadata(), &["agencySlug"]);
    assert_eq!(h.adapter.normalize_entity_name(Entity::Field, "JobTitle"), "jobtitle");
}

#[tokio::test]
async fn test_loxo_missing_agency() {
    let h = Harness::start(ProviderName::Loxo).await;
    let err = h.adapter.read(&h.hc(), &ReadParams::new("jobs")).await.unwrap_err();
    assert!(err.is(ErrorKind::MissingMetadata));
}

#[tokio::test]
async fn test_loxo_update_wraps_key() {
    let h = Harness::start(ProviderName::Loxo)
        .await
        .with_metadata("agencySlug", "acme");
    Mock::given(method("PUT"))
        .and(path("/acme/jobs/55"))
        .and(body_partial_json(json!({"job": {"title": "Engineer"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job": {"id": 55, "title": "Engineer"}
        })))
        .mount(&h.server)
        .await;

    let params = WriteParams::new("jobs", json!({"title": "Engineer"})).record_id("55");
    let result = h.adapter.write(&h.hc(), &params).await.unwrap();
    assert!(result.success);
    assert_eq!(result.record_id, "55");
}

#[tokio::test]
async fn test_lemlist_page_counters() {
    let h = Harness::start(ProviderName::Lemlist).await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("version", "v2"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "campaigns": [{"_id": "cam_1", "name": "Launch"}],
            "pagination": {"totalRecords": 101, "currentPage": 2, "nextPage": 3, "totalPage": 3}
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("campaigns").fields(["name"]).next_page("2");
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.data[0].id, "cam_1");
    assert_eq!(result.next_page, "3");
}

#[tokio::test]
async fn test_lemlist_bare_array_offsets() {
    let h = Harness::start(ProviderName::Lemlist).await;
    let page: Vec<_> = (0..100).map(|i| json!({"_id": format!("act_{i}")})).collect();
    Mock::given(method("GET"))
        .and(path("/activities"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(page)))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("activities").next_page("100").fields(["_id"]);
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.rows, 100);
    assert_eq!(result.next_page, "200");
}

#[tokio::test]
async fn test_chorus_missing_attributes() {
    let h = Harness::start(ProviderName::Chorus).await;
    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"type": "user", "id": "7"}]
        })))
        .mount(&h.server)
        .await;

    let err = h
        .adapter
        .read(&h.hc(), &ReadParams::new("users").fields(["email"]))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::MissingExpectedValues));
}

#[tokio::test]
async fn test_chorus_relative_next_link() {
    let h = Harness::start(ProviderName::Chorus).await;
    Mock::given(method("GET"))
        .and(path("/v1/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"type": "team", "id": "3", "attributes": {"name": "Sales"}}],
            "links": {"next": "/v1/teams?page[number]=2"}
        })))
        .mount(&h.server)
        .await;

    let result = h
        .adapter
        .read(&h.hc(), &ReadParams::new("teams").fields(["name"]))
        .await
        .unwrap();
    assert_eq!(result.data[0].fields["name"], json!("Sales"));
    assert!(result.next_page.starts_with(&h.server.uri()));
    assert!(result.next_page.contains("/v1/teams?page"));
}

#[tokio::test]
async fn test_chorus_engagements_range() {
    let h = Harness::start(ProviderName::Chorus).await;
    Mock::given(method("GET"))
        .and(path("/v3/engagements"))
        .and(query_param("min_date", "2024-05-01T00:00:00Z"))
        .and(query_param("max_date", "2024-06-01T00:00:00Z"))
        .and(query_param("max_hits", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "engagements": [{"engagement_id": "e-1", "subject": "Demo"}],
            "continuation_key": "next-key"
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("engagements")
        .fields(["subject"])
        .since(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        .until(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.data[0].id, "e-1");
    assert_eq!(result.next_page, "next-key");
}

#[tokio::test]
async fn test_talkdesk_contacts_range() {
    let h = Harness::start(ProviderName::Talkdesk).await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("updated_at_from", "2024-02-01T00:00:00Z"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"records": [{"id": "ct-1", "name": "Ada"}]},
            "_links": {"self": {"href": "x"}}
        })))
        .mount(&h.server)
        .await;

    let params = ReadParams::new("contacts")
        .fields(["name"])
        .since(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    let result = h.adapter.read(&h.hc(), &params).await.unwrap();
    assert_eq!(result.data[0].id, "ct-1");
    assert!(result.done);
}

#[tokio::test]
async fn test_revenuecat_relative_link() {
    let h = Harness::start(ProviderName::RevenueCat)
        .await
        .with_metadata("project_id", "proj1");
    Mock::given(method("GET"))
        .and(path("/v2/projects/proj1/customers"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "items": [{"object": "customer", "id": "cus_1"}],
            "next_page": "/v2/projects/proj1/customers?starting_after=cus_1"
        })))
        .mount(&h.server)
        .await;

    let result = h
        .adapter
        .read(&h.hc(), &ReadParams::new("customers").fields(["id"]))
        .await
        .unwrap();
    assert_eq!(
        result.next_page,
        format!("{}/v2/projects/proj1/customers?starting_after=cus_1", h.server.uri())
    );
}

#[tokio::test]
async fn test_ringcentral_error_code() {
    let h = Harness::start(ProviderName::RingCentral).await;
    Mock::given(method("GET"))
        .and(path("/restapi/v1.0/account/~/call-log"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errorCode": "CMN-301", "message": "Request rate exceeded"
        })))
        .mount(&h.server)
        .await;

    let err = h.adapter.read(&h.hc(), &ReadParams::new("call-log")).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(ApiErrorKind::LimitExceeded));
    assert!(err.to_string().contains("CMN-301"));
}

#[tokio::test]
async fn test_granola_cursor_has_more() {
    let h = Harness::start(ProviderName::Granola).await;
    Mock::given(method("GET"))
        .and(path("/v1/notes"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notes": [{"id": "not_1", "title": "Standup"}],
            "hasMore": false,
            "cursor": "ignored"
        })))
        .mount(&h.server)
        .await;

    let result = h
        .adapter
        .read(&h.hc(), &ReadParams::new("notes").fields(["title"]))
        .await
        .unwrap();
    assert!(result.done);
    assert_eq!(result.data[0].fields["title"], json!("Standup"));
}

#[tokio::test]
async fn test_supersend_write_id() {
    let h = Harness::start(ProviderName::Supersend).await;
    Mock::given(method("POST"))
        .and(path("/v1/labels"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true, "data": {"id": "lbl_1", "name": "Hot"}
        })))
        .mount(&h.server)
        .await;

    let result = h
        .adapter
        .write(&h.hc(), &WriteParams::new("labels", json!({"name": "Hot"})))
        .await
        .unwrap();
    assert_eq!(result.record_id, "lbl_1");
}
