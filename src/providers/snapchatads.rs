//! Snapchat Ads
//!
//! Marketing API objects are scoped to the organization discovered from
//! `/me`. Collections wrap each item as `{sub_request_status, <kind>: {...}}`
//! and writes send arrays of such items under the collection key.

use super::{Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::RecordDecoder;
use crate::error::{Error, Result};
use crate::handlers::{
    self, BodyWrap, HandlerContext, IdLocation, ObjectSpec, PageSize, UpdatePath, WriteSpec,
};
use crate::http::{
    DefaultInterpreter, ErrorFormat, ErrorInterpreter, FormatSwitch, HttpRequest, ProviderError,
};
use crate::jsonquery::Query;
use crate::model::{PostAuthInfo, ReadResultRow};
use crate::pagination::PaginationRule;
use crate::types::{Metadata, Method};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const ORGANIZATION_KEY: &str = "organizationId";

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("{adaccounts,billingcenters}", Support::READ_ONLY.with(Support::WRITE)),
    SupportRule::new("{members,roles,fundingsources}", Support::READ_ONLY),
];

/// `{"request_status": "ERROR", "debug_message": "...", "display_message": "..."}`
const REQUEST_STATUS_FORMAT: ErrorFormat =
    ErrorFormat::new("snapchat", &["request_status"], parse_request_status);

fn parse_request_status(body: &Value) -> Option<ProviderError> {
    if body.get("request_status")?.as_str()? == "SUCCESS" {
        return None;
    }
    let message = body
        .get("display_message")
        .or_else(|| body.get("debug_message"))
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    Some(ProviderError::new(message))
}

/// Object name, path template, item key and whether the object is writable
const OBJECTS: &[(&str, &str, &str, bool)] = &[
    ("adaccounts", "organizations/{{ auth.organizationId }}/adaccounts", "adaccount", true),
    ("billingcenters", "organizations/{{ auth.organizationId }}/billingcenters", "billingcenter", true),
    ("members", "organizations/{{ auth.organizationId }}/members", "member", false),
    ("roles", "organizations/{{ auth.organizationId }}/roles", "role", false),
    ("fundingsources", "organizations/{{ auth.organizationId }}/fundingsources", "fundingsource", false),
];

fn object_table(object: &str) -> Option<ObjectSpec> {
    let &(name, path, item, writable) = OBJECTS.iter().find(|(name, ..)| *name == object)?;

    let spec = ObjectSpec::new(name, path, name)
        .records(RecordDecoder::at(name).unwrapping(item))
        .pagination(PaginationRule::UrlField {
            path: "paging.next_link",
        })
        .page_size(PageSize::new("limit", 50, 1000));

    if !writable {
        return Some(spec);
    }

    // the created or updated entity comes back as the first array item
    let id = match name {
        "adaccounts" => "adaccount.id",
        _ => "billingcenter.id",
    };
    Some(
        spec.write(
            WriteSpec::new()
                .update_with(Method::PUT)
                .update_path(UpdatePath::Collection)
                .wrap(BodyWrap::ArrayUnder(name))
                .record_id(IdLocation::FirstArrayItem { path: name, id }),
        ),
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SnapchatAds;

#[async_trait]
impl Provider for SnapchatAds {
    fn name(&self) -> ProviderName {
        ProviderName::SnapchatAds
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([REQUEST_STATUS_FORMAT])))
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        object_table(object).ok_or_else(|| Error::object_not_found(object))
    }

    fn requires_post_auth(&self, _metadata: &Metadata) -> bool {
        true
    }

    async fn post_auth_info(&self, hc: &HandlerContext<'_>) -> Result<PostAuthInfo> {
        let url = hc.module_path("me")?;
        let response = hc.client.send(hc.ctx, HttpRequest::get(&url).headers(hc.headers)).await?;
        let body = response.require_body()?;

        let organization = Query::new(body, &["me"]).string_required("organization_id")?;
        debug!(organization, "resolved snapchat organization");
        Ok(PostAuthInfo::from_pairs([(ORGANIZATION_KEY, organization)]))
    }

    async fn get_record(
        &self,
        hc: &HandlerContext<'_>,
        object: &str,
        record_id: &str,
    ) -> Result<ReadResultRow> {
        let spec = self.object_spec(hc.module, object)?;
        handlers::get_listed_record(hc, &spec, record_id).await
    }
}
