//! Batch create and update
//!
//! Creates are tagged with their input ordinal as `objectWriteTraceId`, which
//! HubSpot echoes on results and errors; updates match back by record id.

use crate::error::{Error, Result};
use crate::handlers::{HandlerContext, ObjectSpec};
use crate::http::{HttpRequest, JsonHttpResponse};
use crate::model::{BatchItem, BatchWriteParams, BatchWriteResult, BatchWriteType, WriteResult};
use crate::types::Method;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

fn input(index: usize, item: &BatchItem, batch_type: BatchWriteType) -> Value {
    let mut entry = Map::new();
    entry.insert("properties".into(), item.record.clone());
    match batch_type {
        BatchWriteType::Create => {
            entry.insert("objectWriteTraceId".into(), json!(index.to_string()));
        }
        BatchWriteType::Update => {
            entry.insert("id".into(), json!(item.record_id.clone().unwrap_or_default()));
        }
    }
    if let Some(associations) = &item.associations {
        entry.insert("associations".into(), associations.clone());
    }
    Value::Object(entry)
}

/// Input positions keyed by the identifier HubSpot echoes back
fn echo_keys(params: &BatchWriteParams) -> HashMap<String, usize> {
    params
        .items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match params.batch_type {
            BatchWriteType::Create => Some((i.to_string(), i)),
            BatchWriteType::Update => item.record_id.clone().map(|id| (id, i)),
        })
        .collect()
}

fn result_key(entry: &Value, batch_type: BatchWriteType) -> Option<String> {
    let key = match batch_type {
        BatchWriteType::Create => "objectWriteTraceId",
        BatchWriteType::Update => "id",
    };
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Keys an error entry refers to: its trace id, or the ids in its context
fn error_keys(entry: &Value) -> Vec<String> {
    if let Some(trace) = entry.get("objectWriteTraceId").and_then(Value::as_str) {
        return vec![trace.to_string()];
    }
    entry
        .pointer("/context/ids")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn failed(record_id: Option<&String>, error: Value) -> WriteResult {
    WriteResult {
        success: false,
        record_id: record_id.cloned().unwrap_or_default(),
        data: None,
        errors: vec![error],
    }
}

/// Every item failed; the top-level message goes to the global errors
fn whole_failure(
    hc: &HandlerContext<'_>,
    params: &BatchWriteParams,
    response: &JsonHttpResponse,
) -> BatchWriteResult {
    let message = hc.client.interpret(response).to_string();
    warn!(object = %params.object_name, status = response.status, %message, "hubspot batch rejected");
    let results = params
        .items
        .iter()
        .map(|item| failed(item.record_id.as_ref(), json!({ "message": message })))
        .collect();
    BatchWriteResult::from_results(results, vec![json!({ "message": message })])
}

fn classify(params: &BatchWriteParams, body: &Value) -> BatchWriteResult {
    let keys = echo_keys(params);
    let mut slots: Vec<Option<WriteResult>> = vec![None; params.items.len()];
    let mut global = Vec::new();

    let results = body
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let ordinal = results.iter().all(|r| result_key(r, params.batch_type).is_none())
        && results.len() == params.items.len();

    for (position, entry) in results.iter().enumerate() {
        let index = match result_key(entry, params.batch_type) {
            Some(key) => keys.get(&key).copied(),
            None if ordinal => Some(position),
            None => None,
        };
        let Some(index) = index else {
            debug!(?entry, "unmatched batch result");
            continue;
        };
        slots[index] = Some(WriteResult {
            success: true,
            record_id: entry.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
            data: Some(entry.clone()),
            errors: Vec::new(),
        });
    }

    for entry in body.get("errors").and_then(Value::as_array).into_iter().flatten() {
        let indexes: Vec<usize> = error_keys(entry)
            .iter()
            .filter_map(|k| keys.get(k).copied())
            .collect();
        if indexes.is_empty() {
            global.push(entry.clone());
            continue;
        }
        for index in indexes {
            let record_id = params.items[index].record_id.as_ref();
            match &mut slots[index] {
                Some(slot) if !slot.success => slot.errors.push(entry.clone()),
                slot => *slot = Some(failed(record_id, entry.clone())),
            }
        }
    }

    let results = slots
        .into_iter()
        .zip(&params.items)
        .map(|(slot, item)| {
            slot.unwrap_or_else(|| {
                failed(
                    item.record_id.as_ref(),
                    json!({ "message": Error::BatchUnprocessedRecord.to_string() }),
                )
            })
        })
        .collect();
    BatchWriteResult::from_results(results, global)
}

pub(super) async fn batch_write(
    hc: &HandlerContext<'_>,
    spec: &ObjectSpec,
    params: &BatchWriteParams,
) -> Result<BatchWriteResult> {
    if params.items.is_empty() {
        return Err(Error::invalid_params("batch write needs at least one item"));
    }
    if params.batch_type == BatchWriteType::Update
        && params.items.iter().any(|i| i.record_id.as_deref().unwrap_or_default().is_empty())
    {
        return Err(Error::invalid_params("batch update items need a record id"));
    }
    if params.batch_type == BatchWriteType::Update {
        let mut seen = HashSet::new();
        if let Some(dup) = params
            .items
            .iter()
            .filter_map(|i| i.record_id.as_deref())
            .find(|id| !seen.insert(*id))
        {
            return Err(Error::invalid_params(format!(
                "batch update lists record '{dup}' more than once"
            )));
        }
    }

    let inputs: Vec<Value> = params
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| input(i, item, params.batch_type))
        .collect();

    let mut url = hc.module_path(spec.path)?;
    url.add_path("batch");
    url.add_path(params.batch_type.as_str());
    let request = HttpRequest::new(Method::POST, &url)
        .headers(hc.headers)
        .json(json!({ "inputs": inputs }));

    debug!(
        object = %params.object_name,
        items = inputs.len(),
        kind = params.batch_type.as_str(),
        "hubspot batch write"
    );
    let response = hc.client.send_unchecked(hc.ctx, request).await?;
    if !response.is_success() {
        return Ok(whole_failure(hc, params, &response));
    }
    match response.body() {
        Some(body) => Ok(classify(params, body)),
        None => Err(Error::EmptyJsonHttpResponse),
    }
}
