//! Parameter checks run before any network I/O

use crate::error::{Error, Result};
use crate::model::{
    BatchWriteParams, DeleteParams, ReadParams, RecordCountParams, SubscribeParams, WriteParams,
};
use crate::pagination::PaginationRule;
use crate::providers::Webhooks;
use serde_json::Value;

pub(crate) fn object_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::MissingObjects);
    }
    Ok(())
}

pub(crate) fn read(params: &ReadParams, fields_optional: bool) -> Result<()> {
    object_name(&params.object_name)?;
    if params.fields.is_empty() && !fields_optional {
        return Err(Error::MissingFields);
    }
    if let (Some(since), Some(until)) = (params.since, params.until) {
        if until < since {
            return Err(Error::invalid_params("until is before since"));
        }
    }
    Ok(())
}

/// Numeric-offset rules only accept tokens that parse as a number
pub(crate) fn next_page(rule: &PaginationRule, token: &str) -> Result<()> {
    rule.offset_of(token).map(|_| ())
}

fn has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

pub(crate) fn write(params: &WriteParams) -> Result<()> {
    object_name(&params.object_name)?;
    if !has_data(&params.record_data) {
        return Err(Error::MissingRecordData);
    }
    Ok(())
}

pub(crate) fn batch_write(params: &BatchWriteParams) -> Result<()> {
    object_name(&params.object_name)?;
    if params.items.is_empty() || params.items.iter().any(|item| !has_data(&item.record)) {
        return Err(Error::MissingRecordData);
    }
    Ok(())
}

pub(crate) fn delete(params: &DeleteParams) -> Result<()> {
    object_name(&params.object_name)?;
    if params.record_id.trim().is_empty() {
        return Err(Error::MissingRecordId);
    }
    Ok(())
}

pub(crate) fn record_count(params: &RecordCountParams) -> Result<()> {
    object_name(&params.object_name)
}

/// Callback URL present, at least one object, every event allowed for its object
pub(crate) fn subscribe(params: &SubscribeParams, webhooks: &dyn Webhooks) -> Result<()> {
    if params.request.webhook_url.trim().is_empty() {
        return Err(Error::invalid_params("missing webhook url"));
    }
    if params.subscription_events.is_empty() {
        return Err(Error::MissingObjects);
    }
    for (object, events) in &params.subscription_events {
        object_name(object)?;
        let allowed = webhooks.allowed_events(object);
        if let Some(event) = events.events.iter().find(|e| !allowed.contains(e)) {
            return Err(Error::InvalidEventType {
                event: format!("{event} on {object}"),
            });
        }
    }
    Ok(())
}
