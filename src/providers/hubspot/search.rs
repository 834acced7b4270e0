//! CRM search: incremental reads, long property lists and record counts

use crate::error::{Error, Result};
use crate::handlers::{parse_read_response, HandlerContext, ObjectSpec};
use crate::http::HttpRequest;
use crate::jsonquery::Query;
use crate::model::{ReadParams, ReadResult, RecordCountParams, RecordCountResult};
use crate::pagination::PaginationRule;
use crate::types::{CursorFormat, Method};
use crate::urlbuilder::UrlBuilder;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::debug;

/// Search cannot page past this many results
pub(super) const SEARCH_LIMIT: u64 = 10_000;

/// Property lists longer than this do not fit in a list URL
const MAX_PROPERTIES_LEN: usize = 1800;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 200;

const SEARCH_PAGINATION: PaginationRule = PaginationRule::OffsetAfter {
    path: "paging.next.after",
    param: "after",
};

/// Comma-joined requested properties
pub(super) fn property_list(params: &ReadParams) -> String {
    params
        .fields
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Search tokens are numeric offsets; list tokens are URLs
pub(super) fn is_search_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

pub(super) fn should_search(params: &ReadParams) -> bool {
    params.since.is_some()
        || params.until.is_some()
        || is_search_token(&params.next_page)
        || property_list(params).len() > MAX_PROPERTIES_LEN
}

/// Reject tokens past the search window before any request
pub(super) fn check_limit(next_page: &str) -> Result<()> {
    if !is_search_token(next_page) {
        return Ok(());
    }
    match next_page.parse::<u64>() {
        Ok(offset) if offset < SEARCH_LIMIT => Ok(()),
        Ok(_) => Err(Error::ResultsLimitExceeded {
            limit: SEARCH_LIMIT,
        }),
        Err(_) => Err(Error::next_page_invalid(next_page)),
    }
}

/// Property carrying the last modification time
fn modified_property(object: &str) -> &'static str {
    match object {
        "contacts" => "lastmodifieddate",
        _ => "hs_lastmodifieddate",
    }
}

fn time_filters(
    object: &str,
    since: Option<&DateTime<Utc>>,
    until: Option<&DateTime<Utc>>,
) -> Value {
    let property = modified_property(object);
    let mut filters = Vec::new();
    if let Some(since) = since {
        filters.push(json!({
            "propertyName": property,
            "operator": "GTE",
            "value": CursorFormat::UnixMs.format(since),
        }));
    }
    if let Some(until) = until {
        filters.push(json!({
            "propertyName": property,
            "operator": "LT",
            "value": CursorFormat::UnixMs.format(until),
        }));
    }
    if filters.is_empty() {
        json!([])
    } else {
        json!([{ "filters": filters }])
    }
}

fn search_url(hc: &HandlerContext<'_>, spec: &ObjectSpec) -> Result<UrlBuilder> {
    let mut url = hc.module_path(spec.path)?;
    url.add_path("search");
    Ok(url)
}

/// One page of search results, oldest modification first
pub(super) async fn search(
    hc: &HandlerContext<'_>,
    spec: &ObjectSpec,
    params: &ReadParams,
) -> Result<ReadResult> {
    check_limit(&params.next_page)?;
    let limit = params
        .page_size
        .map_or(DEFAULT_LIMIT, |n| n.clamp(1, MAX_LIMIT));
    let offset = SEARCH_PAGINATION.offset_of(&params.next_page)?;

    let mut body = json!({
        "filterGroups": time_filters(&params.object_name, params.since.as_ref(), params.until.as_ref()),
        "sorts": [{
            "propertyName": modified_property(&params.object_name),
            "direction": "ASCENDING",
        }],
        "limit": limit,
        "properties": params.fields,
    });
    if !params.next_page.is_empty() {
        body["after"] = json!(params.next_page);
    }

    let url = search_url(hc, spec)?;
    let request = HttpRequest::new(Method::POST, &url)
        .headers(hc.headers)
        .json(body);
    let request_url = request.url.clone();

    debug!(object = %params.object_name, after = %params.next_page, "searching hubspot records");
    let response = hc.client.send(hc.ctx, request).await?;
    let search_spec = spec.pagination(SEARCH_PAGINATION);
    parse_read_response(
        &search_spec,
        &response,
        &request_url,
        Some(limit),
        offset,
        &params.lowercase_fields(),
    )
}

/// Total matching records, from a one-record search
pub(super) async fn count(
    hc: &HandlerContext<'_>,
    spec: &ObjectSpec,
    params: &RecordCountParams,
) -> Result<RecordCountResult> {
    let body = json!({
        "filterGroups": time_filters(&params.object_name, params.since.as_ref(), params.until.as_ref()),
        "limit": 1,
        "properties": ["hs_object_id"],
    });

    let url = search_url(hc, spec)?;
    let request = HttpRequest::new(Method::POST, &url)
        .headers(hc.headers)
        .json(body);
    let response = hc.client.send(hc.ctx, request).await?;
    let total = Query::new(response.require_body()?, &[]).integer_required("total")?;

    Ok(RecordCountResult {
        count: u64::try_from(total).unwrap_or(0),
    })
}
