//! Pagination types
//!
//! Defines the next-page rules and the inputs they read.

use crate::types::JsonObject;
use url::Url;

/// How a stored token is turned back into a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this URL verbatim
    Url(Url),
    /// Apply a query parameter to the object URL
    Query { param: &'static str, value: String },
}

/// How an object derives its next-page token
///
/// Paths are dotted (`paging.next.link`) and resolved with the JSON query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationRule {
    /// Single page; the token is always empty
    #[default]
    Absent,

    /// Absolute URL at `path`
    UrlField { path: &'static str },

    /// URL at `path` that may be relative to the request URL
    RelativeUrlField { path: &'static str },

    /// Opaque cursor at `path`, sent back as `param`
    ///
    /// When `has_more` is set, a false flag ends pagination even if a cursor
    /// is present.
    Cursor {
        path: &'static str,
        param: &'static str,
        has_more: Option<&'static str>,
    },

    /// Numeric offset at `path` (HubSpot `paging.next.after`)
    OffsetAfter {
        path: &'static str,
        param: &'static str,
    },

    /// `hasMore` flag plus numeric `offset`
    HasMoreOffset {
        has_more: &'static str,
        offset: &'static str,
        param: &'static str,
    },

    /// Current page and total page counters; the first request sends page 1
    PageCount {
        current: &'static str,
        total: &'static str,
        param: &'static str,
    },

    /// `has_more` flag; the next page starts after the last record's id
    LastIdCursor {
        has_more: &'static str,
        param: &'static str,
    },

    /// Offset advanced by the number of records while pages come back full
    OffsetByCount { param: &'static str },
}

/// Inputs available when deriving a next-page token
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// URL of the request that produced the response
    pub request_url: &'a Url,
    /// Number of records in the response
    pub record_count: usize,
    /// Last record of the response (needed by `LastIdCursor`)
    pub last_record: Option<&'a JsonObject>,
    /// Page size sent with the request
    pub page_size: Option<u32>,
    /// Offset of this page (from the previous token)
    pub offset: u64,
    /// Record identifier key
    pub id_field: &'a str,
}
