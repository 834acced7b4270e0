//! Pagination module
//!
//! Supports: URL fields (absolute or relative), opaque cursors, numeric
//! `after` offsets, `hasMore` + offset, page counters, last-id cursors and
//! offsets advanced by record count.
//!
//! # Overview
//!
//! Each adapter declares one [`PaginationRule`] per object. The rule derives
//! the opaque `next_page` token from a response and, on the following read,
//! turns that token back into a request: either a URL fetched verbatim or a
//! query parameter applied to the object URL.

mod strategies;
mod types;

pub use types::{NextPage, PageContext, PaginationRule};
