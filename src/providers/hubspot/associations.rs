//! Association filler
//!
//! Attaches related-object ids to a page of rows with one batch read per
//! requested object. A 404 from the association endpoint means none.

use crate::error::{ApiErrorKind, Result};
use crate::handlers::HandlerContext;
use crate::http::HttpRequest;
use crate::model::{Association, ReadResultRow};
use crate::types::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Associations of each source id
async fn batch_read(
    hc: &HandlerContext<'_>,
    from: &str,
    to: &str,
    ids: &[&str],
) -> Result<HashMap<String, Vec<Association>>> {
    let url = hc.base_path(&format!("crm/v4/associations/{from}/{to}/batch/read"))?;
    let inputs: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    let request = HttpRequest::new(Method::POST, &url)
        .headers(hc.headers)
        .json(json!({ "inputs": inputs }));

    let response = match hc.client.send(hc.ctx, request).await {
        Ok(response) => response,
        Err(e) if e.api_kind() == Some(ApiErrorKind::NotFound) => {
            debug!(from, to, "no associations");
            return Ok(HashMap::new());
        }
        Err(e) => return Err(e),
    };

    let mut out: HashMap<String, Vec<Association>> = HashMap::new();
    let results = response
        .body()
        .and_then(|b| b.get("results"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    for result in results {
        let Some(source) = result.pointer("/from/id").map(id_text) else {
            continue;
        };
        let targets = result.get("to").and_then(Value::as_array).into_iter().flatten();
        let entry = out.entry(source).or_default();
        for target in targets {
            let Some(object_id) = target.get("toObjectId").map(id_text) else {
                continue;
            };
            entry.push(Association {
                object_id,
                association_type: association_type(target),
                raw: target.as_object().cloned(),
            });
        }
    }
    Ok(out)
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Label of the first association type, else its numeric id
fn association_type(target: &Value) -> String {
    let first = target.pointer("/associationTypes/0");
    first
        .and_then(|t| t.get("label"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| first.and_then(|t| t.get("typeId")).map(id_text))
        .unwrap_or_default()
}

pub(super) async fn attach(
    hc: &HandlerContext<'_>,
    object: &str,
    related: &[String],
    rows: &mut [ReadResultRow],
) -> Result<()> {
    let ids: Vec<String> = rows
        .iter()
        .filter(|r| !r.id.is_empty())
        .map(|r| r.id.clone())
        .collect();
    if ids.is_empty() {
        return Ok(());
    }
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    for to in related {
        let mut by_source = batch_read(hc, object, to, &id_refs).await?;
        for row in rows.iter_mut() {
            if let Some(associations) = by_source.remove(&row.id) {
                row.associations.insert(to.clone(), associations);
            }
        }
    }
    Ok(())
}
