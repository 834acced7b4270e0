//! Calendly
//!
//! Organization-scoped v2 API. Every collection needs the organization URI
//! discovered from `users/me`; records are identified by their `uri`.
//! Webhook subscriptions are organization webhooks signed with HMAC-SHA256.

mod webhooks;

pub use webhooks::{CalendlyEvent, CalendlyWebhooks};

use super::{schema_spec, Provider, ProviderName, Webhooks};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::{Marshaller, RecordShape};
use crate::error::{Error, Result};
use crate::handlers::{HandlerContext, Incremental, ObjectSpec, PageSize};
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, HttpRequest, MESSAGE_FORMAT};
use crate::jsonquery::Query;
use crate::model::{DeleteParams, DeleteResult, PostAuthInfo, ReadResultRow, SubscriptionEvent};
use crate::pagination::PaginationRule;
use crate::types::{CursorFormat, JsonObject, Metadata};
use crate::urlbuilder::UrlBuilder;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

pub(crate) const USER_KEY: &str = "user";
pub(crate) const ORGANIZATION_KEY: &str = "organization";

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("webhook_subscriptions", Support::READ_ONLY.with(Support::DELETE)),
    SupportRule::new(
        "{scheduled_events,event_types,organization_memberships,routing_forms,groups}",
        Support::READ_ONLY,
    ),
    SupportRule::new("{invitees,routing_form_submissions}", Support::SUBSCRIBE),
];

const BY_URI: Marshaller = Marshaller::new(RecordShape::Plain, "uri");

/// Last segment of a Calendly resource URI; plain ids pass through
pub(crate) fn uri_id(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Calendly;

#[async_trait]
impl Provider for Calendly {
    fn name(&self) -> ProviderName {
        ProviderName::Calendly
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([MESSAGE_FORMAT])))
    }

    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec> {
        let spec = schema_spec(ProviderName::Calendly, module, object)?
            .marshaller(BY_URI)
            .pagination(PaginationRule::UrlField {
                path: "pagination.next_page",
            })
            .page_size(PageSize::new("count", 20, 100));

        Ok(match object {
            "scheduled_events" => spec
                .query(&[("organization", "{{ auth.organization }}")])
                .incremental(Incremental::QueryRange {
                    since: "min_start_time",
                    until: Some("max_start_time"),
                    format: CursorFormat::Iso8601,
                }),
            "webhook_subscriptions" => spec.query(&[
                ("organization", "{{ auth.organization }}"),
                ("scope", "organization"),
            ]),
            _ => spec.query(&[("organization", "{{ auth.organization }}")]),
        })
    }

    fn requires_post_auth(&self, _metadata: &Metadata) -> bool {
        true
    }

    /// Current user and organization URIs
    async fn post_auth_info(&self, hc: &HandlerContext<'_>) -> Result<PostAuthInfo> {
        let url = hc.module_path("users/me")?;
        let response = hc.client.send(hc.ctx, HttpRequest::get(&url).headers(hc.headers)).await?;
        let body = response.require_body()?;

        let q = Query::new(body, &["resource"]);
        let user = q.string_required("uri")?;
        let organization = q.string_required("current_organization")?;
        debug!(organization, "resolved calendly organization");

        Ok(PostAuthInfo::from_pairs([
            (USER_KEY, user),
            (ORGANIZATION_KEY, organization),
        ]))
    }

    async fn delete(&self, hc: &HandlerContext<'_>, params: &DeleteParams) -> Result<DeleteResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        let mut url = hc.module_path(spec.path)?;
        url.push_segment(uri_id(&params.record_id));

        hc.client.delete(hc.ctx, &url.to_url(), hc.headers).await?;
        Ok(DeleteResult { success: true })
    }

    fn single_record_path(&self, _object: &str) -> &'static str {
        "resource"
    }

    /// Events carry the full resource URI; it is fetched as-is
    async fn get_record_from_event(
        &self,
        hc: &HandlerContext<'_>,
        event: &dyn SubscriptionEvent,
    ) -> Result<ReadResultRow> {
        let uri = Query::new(event.raw(), &["payload"]).string_required("uri")?;
        let url = UrlBuilder::parse(uri)?;

        let response = hc.client.send(hc.ctx, HttpRequest::get(&url).headers(hc.headers)).await?;
        let raw: JsonObject = Query::new(response.require_body()?, &[])
            .object_required("resource")?
            .clone();

        let mut rows = BY_URI.marshal(vec![raw.clone()], &BTreeSet::new())?;
        let mut row = rows.pop().ok_or(Error::EmptyJsonHttpResponse)?;
        row.id = uri_id(uri).to_string();
        row.fields = raw.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
        Ok(row)
    }

    fn webhooks(&self) -> Option<&dyn Webhooks> {
        Some(&CalendlyWebhooks)
    }
}
