//! Read handler

use super::context::HandlerContext;
use super::types::{Incremental, ObjectSpec};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, JsonHttpResponse};
use crate::jsonquery::{parse_result, Query};
use crate::model::{ReadParams, ReadResult, ReadResultRow};
use crate::pagination::{NextPage, PageContext, PaginationRule};
use crate::template::render;
use crate::types::{JsonObject, Method};
use crate::urlbuilder::{Headers, UrlBuilder};
use std::collections::BTreeSet;
use tracing::debug;
use url::Url;

/// A built read request and the paging state it was built with
#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub request: HttpRequest,
    pub page_size: Option<u32>,
    pub offset: u64,
}

/// Build the request for one page of an object
pub fn build_read_request(
    hc: &HandlerContext<'_>,
    spec: &ObjectSpec,
    params: &ReadParams,
) -> Result<ReadRequest> {
    let offset = spec.pagination.offset_of(&params.next_page)?;
    let page_size = spec.page_size.map(|p| p.resolve(params.page_size));
    let mut headers = hc.headers.clone();

    let next = if params.next_page.is_empty() {
        None
    } else {
        Some(spec.pagination.resolve(&params.next_page)?)
    };

    // URL tokens are fetched verbatim
    if let Some(NextPage::Url(url)) = &next {
        if url.cannot_be_a_base() {
            return Err(Error::invalid_params(format!("invalid next page URL: {url}")));
        }
        return Ok(ReadRequest {
            request: HttpRequest::raw(Method::GET, url.clone()).headers(&headers),
            page_size,
            offset,
        });
    }

    let mut url = hc.module_path(spec.path)?;
    let template = hc.template();
    for (key, value) in spec.query {
        url.with_query_param(*key, render(value, &template)?);
    }
    if let (Some(size), Some(n)) = (spec.page_size, page_size) {
        url.with_query_param(size.param, n.to_string());
    }
    if let Some((param, value)) = spec.pagination.initial_param() {
        url.with_query_param(param, value);
    }

    apply_incremental(spec, params, &mut url, &mut headers)?;

    if let Some(NextPage::Query { param, value }) = next {
        url.with_query_param(param, value);
    }

    Ok(ReadRequest {
        request: HttpRequest::get(&url).headers(&headers),
        page_size,
        offset,
    })
}

fn apply_incremental(
    spec: &ObjectSpec,
    params: &ReadParams,
    url: &mut UrlBuilder,
    headers: &mut Headers,
) -> Result<()> {
    let filter = params.filter.as_deref().filter(|f| !f.is_empty());

    match spec.incremental {
        Incremental::FilterExpression { field, format } => {
            let mut parts = Vec::new();
            if let Some(since) = &params.since {
                parts.push(format!("greater-than({field},{})", format.format(since)));
            }
            if let Some(until) = &params.until {
                parts.push(format!("less-than({field},{})", format.format(until)));
            }
            if let Some(filter) = filter {
                parts.push(filter.to_string());
            }
            if !parts.is_empty() {
                url.with_query_param("filter", parts.join(","));
            }
            return Ok(());
        }

        Incremental::QueryRange {
            since,
            until,
            format,
        } => {
            if let Some(ts) = &params.since {
                url.with_query_param(since, format.format(ts));
            }
            match (until, &params.until) {
                (Some(param), Some(ts)) => {
                    url.with_query_param(param, format.format(ts));
                }
                (None, Some(_)) => debug!(object = %params.object_name, "upper bound not supported, ignored"),
                _ => {}
            }
        }

        Incremental::IfModifiedSince => match (&params.since, &params.until) {
            (Some(since), _) => {
                headers.set(
                    "If-Modified-Since",
                    since.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
                );
                if params.until.is_some() {
                    debug!(object = %params.object_name, "upper bound not supported, ignored");
                }
            }
            (None, Some(_)) => {
                return Err(Error::invalid_params(format!(
                    "'{}' supports an upper bound only together with a lower bound",
                    params.object_name
                )));
            }
            (None, None) => {}
        },

        Incremental::None => {
            if params.since.is_some() || params.until.is_some() {
                debug!(object = %params.object_name, "incremental bounds not supported, ignored");
            }
        }
    }

    if let Some(filter) = filter {
        let Some(param) = spec.filter_param else {
            return Err(Error::invalid_params(format!(
                "filtering is not supported for '{}'",
                params.object_name
            )));
        };
        url.with_query_param(param, filter);
    }

    Ok(())
}

/// Parse one page of an object
pub fn parse_read_response(
    spec: &ObjectSpec,
    response: &JsonHttpResponse,
    request_url: &Url,
    page_size: Option<u32>,
    offset: u64,
    fields: &BTreeSet<String>,
) -> Result<ReadResult> {
    let Some(body) = response.body() else {
        return Ok(ReadResult::new(Vec::new(), String::new()));
    };

    parse_result(
        body,
        |b| spec.records.extract(b),
        |b, count| {
            let last = match spec.pagination {
                PaginationRule::LastIdCursor { .. } => spec.records.extract(b)?.pop(),
                _ => None,
            };
            spec.pagination.next_token(
                b,
                &PageContext {
                    request_url,
                    record_count: count,
                    last_record: last.as_ref(),
                    page_size,
                    offset,
                    id_field: spec.marshaller.id_field,
                },
            )
        },
        |records, fields| spec.marshaller.marshal(records, fields),
        fields,
    )
}

/// Read one page of an object
pub async fn read(hc: &HandlerContext<'_>, spec: &ObjectSpec, params: &ReadParams) -> Result<ReadResult> {
    let ReadRequest {
        request,
        page_size,
        offset,
    } = build_read_request(hc, spec, params)?;
    let url = request.url.clone();

    debug!(object = %params.object_name, %url, "reading page");
    let response = hc.client.send(hc.ctx, request).await?;

    let result = parse_read_response(
        spec,
        &response,
        &url,
        page_size,
        offset,
        &params.lowercase_fields(),
    )?;
    debug!(object = %params.object_name, rows = result.rows, done = result.done, "read page");
    Ok(result)
}

/// Fetch a single record by id
///
/// `record_path` locates the record in the response (empty for the body).
pub async fn get_record(
    hc: &HandlerContext<'_>,
    spec: &ObjectSpec,
    record_id: &str,
    record_path: &str,
) -> Result<ReadResultRow> {
    let mut url = hc.module_path(spec.path)?;
    url.push_segment(record_id);

    let request = HttpRequest::get(&url).headers(hc.headers);
    let response = hc.client.send(hc.ctx, request).await?;
    let body = response.require_body()?;

    let (q, key) = Query::at_path(body, record_path);
    let raw: JsonObject = q.object_required(&key)?.clone();

    full_view_row(spec, raw, record_id)
}

/// Fetch a single record whose by-id response repeats the list shape
/// (a one-element records array)
pub async fn get_listed_record(
    hc: &HandlerContext<'_>,
    spec: &ObjectSpec,
    record_id: &str,
) -> Result<ReadResultRow> {
    let mut url = hc.module_path(spec.path)?;
    url.push_segment(record_id);

    let request = HttpRequest::get(&url).headers(hc.headers);
    let response = hc.client.send(hc.ctx, request).await?;
    let raw = spec
        .records
        .extract(response.require_body()?)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::object_not_found(record_id))?;

    full_view_row(spec, raw, record_id)
}

/// Marshal a fetched record, keeping every projected field
fn full_view_row(spec: &ObjectSpec, raw: JsonObject, record_id: &str) -> Result<ReadResultRow> {
    let view = spec.marshaller.shape.project(&raw)?;
    let mut row = spec
        .marshaller
        .marshal(vec![raw], &BTreeSet::new())?
        .pop()
        .ok_or(Error::EmptyJsonHttpResponse)?;
    if row.id.is_empty() {
        row.id = record_id.to_string();
    }
    row.fields = view
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect();
    Ok(row)
}
