//! Read-result pipeline

use crate::error::Result;
use crate::model::{ReadResult, ReadResultRow};
use crate::types::JsonObject;
use serde_json::Value;
use std::collections::BTreeSet;

/// Build a [`ReadResult`] from a response body.
///
/// - `records` extracts the raw records
/// - `next_page` derives the pagination token (empty when done)
/// - `marshal` projects the requested fields into rows
pub fn parse_result<R, N, M>(
    body: &Value,
    records: R,
    next_page: N,
    marshal: M,
    fields: &BTreeSet<String>,
) -> Result<ReadResult>
where
    R: FnOnce(&Value) -> Result<Vec<JsonObject>>,
    N: FnOnce(&Value, usize) -> Result<String>,
    M: FnOnce(Vec<JsonObject>, &BTreeSet<String>) -> Result<Vec<ReadResultRow>>,
{
    let raw = records(body)?;
    let next = next_page(body, raw.len())?;
    let rows = marshal(raw, fields)?;

    Ok(ReadResult::new(rows, next))
}
