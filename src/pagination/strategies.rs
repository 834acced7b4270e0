//! Next-page rule implementations

use super::types::{NextPage, PageContext, PaginationRule};
use crate::error::{Error, Result};
use crate::jsonquery::Query;
use serde_json::Value;
use url::Url;

impl PaginationRule {
    /// Derive the next-page token from a response; empty when done
    pub fn next_token(&self, body: &Value, ctx: &PageContext<'_>) -> Result<String> {
        match *self {
            Self::Absent => Ok(String::new()),

            Self::UrlField { path } => Ok(text_at(body, path)?.unwrap_or_default()),

            Self::RelativeUrlField { path } => match text_at(body, path)? {
                Some(link) if !link.is_empty() => Ok(resolve_link(ctx.request_url, &link)?.into()),
                _ => Ok(String::new()),
            },

            Self::Cursor {
                path,
                has_more,
                ..
            } => {
                if let Some(flag) = has_more {
                    if !bool_at(body, flag)?.unwrap_or(false) {
                        return Ok(String::new());
                    }
                }
                Ok(text_at(body, path)?.unwrap_or_default())
            }

            Self::OffsetAfter { path, .. } => Ok(text_at(body, path)?.unwrap_or_default()),

            Self::HasMoreOffset {
                has_more, offset, ..
            } => {
                if !bool_at(body, has_more)?.unwrap_or(false) {
                    return Ok(String::new());
                }
                Ok(text_at(body, offset)?.unwrap_or_default())
            }

            Self::PageCount { current, total, .. } => {
                let (q, key) = Query::at_path(body, current);
                let Some(current) = q.integer_optional(&key)? else {
                    return Ok(String::new());
                };
                let (q, key) = Query::at_path(body, total);
                let total = q.integer_optional(&key)?.unwrap_or(current);
                if current < total {
                    Ok((current + 1).to_string())
                } else {
                    Ok(String::new())
                }
            }

            Self::LastIdCursor { has_more, .. } => {
                if !bool_at(body, has_more)?.unwrap_or(false) {
                    return Ok(String::new());
                }
                let Some(last) = ctx.last_record else {
                    return Ok(String::new());
                };
                let node = Value::Object(last.clone());
                Ok(Query::new(&node, &[])
                    .text_optional(ctx.id_field)?
                    .unwrap_or_default())
            }

            Self::OffsetByCount { .. } => {
                let count = ctx.record_count as u64;
                match ctx.page_size {
                    Some(size) if count > 0 && count >= u64::from(size) => {
                        Ok((ctx.offset + count).to_string())
                    }
                    _ => Ok(String::new()),
                }
            }
        }
    }

    /// Turn a stored token into a request
    pub fn resolve(&self, token: &str) -> Result<NextPage> {
        match *self {
            Self::Absent => Err(Error::next_page_invalid(token)),
            Self::UrlField { .. } | Self::RelativeUrlField { .. } => Url::parse(token)
                .map(NextPage::Url)
                .map_err(|_| Error::next_page_invalid(token)),
            Self::Cursor { param, .. } | Self::LastIdCursor { param, .. } => Ok(NextPage::Query {
                param,
                value: token.to_string(),
            }),
            Self::OffsetAfter { param, .. }
            | Self::HasMoreOffset { param, .. }
            | Self::PageCount { param, .. }
            | Self::OffsetByCount { param } => {
                let offset = parse_offset(token)?;
                Ok(NextPage::Query {
                    param,
                    value: offset.to_string(),
                })
            }
        }
    }

    /// Query parameter sent with the first page, if the rule needs one
    pub fn initial_param(&self) -> Option<(&'static str, String)> {
        match *self {
            Self::PageCount { param, .. } => Some((param, "1".to_string())),
            _ => None,
        }
    }

    /// True when tokens are numeric offsets
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::OffsetAfter { .. }
                | Self::HasMoreOffset { .. }
                | Self::PageCount { .. }
                | Self::OffsetByCount { .. }
        )
    }

    /// Offset encoded in a token; zero for the first page and non-numeric rules
    pub fn offset_of(&self, token: &str) -> Result<u64> {
        if token.is_empty() || !self.is_numeric() {
            return Ok(0);
        }
        parse_offset(token)
    }
}

/// Parse a numeric next-page token
pub(crate) fn parse_offset(token: &str) -> Result<u64> {
    token
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::next_page_invalid(token))
}

fn text_at(body: &Value, path: &str) -> Result<Option<String>> {
    let (q, key) = Query::at_path(body, path);
    q.text_optional(&key)
}

fn bool_at(body: &Value, path: &str) -> Result<Option<bool>> {
    let (q, key) = Query::at_path(body, path);
    q.bool_optional(&key)
}

fn resolve_link(base: &Url, link: &str) -> Result<Url> {
    match Url::parse(link) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(base.join(link)?),
        Err(e) => Err(e.into()),
    }
}
