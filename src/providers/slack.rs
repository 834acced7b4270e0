//! Slack
//!
//! Web API methods (`users.list`, `conversations.list`) always answer 200;
//! failures are reported as `{"ok": false, "error": "<code>"}` and mapped to
//! the uniform error classes by code.

use super::{Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::{ApiErrorKind, Error, Result};
use crate::handlers::{HandlerContext, ObjectSpec, PageSize};
use crate::http::{
    DefaultInterpreter, ErrorFormat, ErrorInterpreter, FormatSwitch, HttpRequest, ProviderError,
};
use crate::jsonquery::Query;
use crate::model::{PostAuthInfo, ReadResultRow};
use crate::pagination::PaginationRule;
use crate::types::JsonObject;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

const SUPPORT: &[SupportRule] = &[SupportRule::new(
    "{users,channels,usergroups}",
    Support::READ_ONLY,
)];

/// `{"ok": false, "error": "invalid_auth"}`
const ENVELOPE_FORMAT: ErrorFormat = ErrorFormat::new("slack", &["ok", "error"], parse_envelope);

fn parse_envelope(body: &Value) -> Option<ProviderError> {
    if body.get("ok")?.as_bool()? {
        return None;
    }
    let code = body.get("error")?.as_str()?;
    Some(ProviderError::new(code).with_kind(error_kind(code)))
}

/// Uniform class of a Slack error code
fn error_kind(code: &str) -> ApiErrorKind {
    match code {
        "invalid_auth" | "not_authed" | "token_revoked" | "token_expired" | "account_inactive" => {
            ApiErrorKind::AccessToken
        }
        "missing_scope" | "no_permission" | "not_allowed_token_type" | "team_access_not_granted" => {
            ApiErrorKind::Forbidden
        }
        "ratelimited" | "rate_limited" => ApiErrorKind::LimitExceeded,
        "channel_not_found" | "user_not_found" | "method_not_found" => ApiErrorKind::NotFound,
        "internal_error" | "fatal_error" => ApiErrorKind::Server,
        "service_unavailable" => ApiErrorKind::ApiDisabled,
        _ => ApiErrorKind::BadRequest,
    }
}

const CURSOR: PaginationRule = PaginationRule::Cursor {
    path: "response_metadata.next_cursor",
    param: "cursor",
    has_more: None,
};

fn object_table(object: &str) -> Option<ObjectSpec> {
    let spec = match object {
        "users" => ObjectSpec::new("Users", "users.list", "members")
            .pagination(CURSOR)
            .page_size(PageSize::new("limit", 200, 1000)),
        "channels" => ObjectSpec::new("Channels", "conversations.list", "channels")
            .pagination(CURSOR)
            .page_size(PageSize::new("limit", 200, 1000)),
        "usergroups" => ObjectSpec::new("User Groups", "usergroups.list", "usergroups"),
        _ => return None,
    };
    Some(spec)
}

/// Lookup method, its id parameter and the response key of one record
fn info_method(object: &str) -> Option<(&'static str, &'static str, &'static str)> {
    match object {
        "users" => Some(("users.info", "user", "user")),
        "channels" => Some(("conversations.info", "channel", "channel")),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Slack;

#[async_trait]
impl Provider for Slack {
    fn name(&self) -> ProviderName {
        ProviderName::Slack
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        let formats = FormatSwitch::new([ENVELOPE_FORMAT]);
        Arc::new(DefaultInterpreter::new(formats.clone()).with_envelope(formats))
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        object_table(object).ok_or_else(|| Error::object_not_found(object))
    }

    async fn post_auth_info(&self, hc: &HandlerContext<'_>) -> Result<PostAuthInfo> {
        let url = hc.module_path("auth.test")?;
        let response = hc.client.send(hc.ctx, HttpRequest::get(&url).headers(hc.headers)).await?;
        let body = response.require_body()?;

        let q = Query::new(body, &[]);
        let team_id = q.string_required("team_id")?;
        let user_id = q.string_required("user_id")?;
        debug!(team_id, "resolved slack workspace");

        Ok(PostAuthInfo::from_pairs([("team_id", team_id), ("user_id", user_id)]))
    }

    async fn get_record(
        &self,
        hc: &HandlerContext<'_>,
        object: &str,
        record_id: &str,
    ) -> Result<ReadResultRow> {
        let (method, param, key) =
            info_method(object).ok_or_else(|| Error::object_not_found(object))?;
        let mut url = hc.module_path(method)?;
        url.with_query_param(param, record_id);

        let response = hc.client.send(hc.ctx, HttpRequest::get(&url).headers(hc.headers)).await?;
        let raw: JsonObject = Query::new(response.require_body()?, &[])
            .object_required(key)?
            .clone();

        let spec = self.object_spec(hc.module, object)?;
        let mut rows = spec.marshaller.marshal(vec![raw.clone()], &BTreeSet::new())?;
        let mut row = rows.pop().ok_or(Error::EmptyJsonHttpResponse)?;
        row.fields = raw.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
        Ok(row)
    }
}
