//! Write handler

use super::context::HandlerContext;
use super::types::{BodyEncoding, BodyWrap, IdLocation, ObjectSpec, UpdatePath};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, RequestBody};
use crate::jsonquery::Query;
use crate::model::{Operation, WriteParams, WriteResult};
use crate::urlbuilder::form_pairs;
use serde_json::{json, Value};
use tracing::debug;

/// Create or update a single record
pub async fn write(hc: &HandlerContext<'_>, spec: &ObjectSpec, params: &WriteParams) -> Result<WriteResult> {
    let write = spec
        .write
        .ok_or_else(|| Error::not_supported(Operation::Write, &params.object_name))?;

    let mut url = hc.module_path(spec.path)?;
    let update = params.is_update();
    let record_id = params.record_id.clone().unwrap_or_default();

    let method = if update {
        if write.update_path == UpdatePath::PerRecord {
            url.push_segment(&record_id);
        }
        write.update
    } else {
        write.create
    }
    .ok_or_else(|| Error::not_supported(Operation::Write, &params.object_name))?;

    let mut record = params.record_data.clone();
    if update && write.update_path == UpdatePath::Collection {
        // the collection URL carries no id
        if let Value::Object(map) = &mut record {
            map.entry("id").or_insert_with(|| Value::String(record_id.clone()));
        }
    }
    if let (Some(associations), Value::Object(map)) = (&params.associations, &mut record) {
        map.entry("associations").or_insert_with(|| associations.clone());
    }
    let payload = wrap(write.wrap, record);
    let body = match write.encoding {
        BodyEncoding::Json => RequestBody::Json(payload),
        BodyEncoding::Form => RequestBody::Form(form_pairs(&payload)?),
    };

    let mut request = HttpRequest::new(method, &url)
        .headers(hc.headers)
        .headers(&params.headers);
    request.body = body;

    debug!(object = %params.object_name, %method, update, "writing record");
    let response = hc.client.send(hc.ctx, request).await?;
    let data = response.body().cloned();

    let record_id = if update {
        record_id
    } else {
        match &data {
            Some(body) => extract_record_id(body, write.record_id)?,
            None => String::new(),
        }
    };

    Ok(WriteResult {
        success: true,
        record_id,
        data,
        errors: Vec::new(),
    })
}

fn wrap(rule: BodyWrap, record: Value) -> Value {
    match rule {
        BodyWrap::None => record,
        BodyWrap::Key(key) => json!({ key: record }),
        BodyWrap::ArrayUnder(key) => json!({ key: [record] }),
    }
}

/// Extract a created record's id from a write response
pub fn extract_record_id(body: &Value, location: IdLocation) -> Result<String> {
    match location {
        IdLocation::None => Ok(String::new()),

        IdLocation::Path(path) => {
            let (q, key) = Query::at_path(body, path);
            q.text_optional(&key)?
                .ok_or_else(|| Error::missing_values(format!("no record id at '{path}'")))
        }

        IdLocation::LastUriSegment(path) => {
            let (q, key) = Query::at_path(body, path);
            let uri = q.string_required(&key)?;
            uri.trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| Error::missing_values(format!("'{uri}' has no id segment")))
        }

        IdLocation::FirstMapKey(path) => {
            let (q, key) = Query::at_path(body, path);
            q.object_required(&key)?
                .keys()
                .next()
                .cloned()
                .ok_or_else(|| Error::missing_values(format!("'{path}' is empty")))
        }

        IdLocation::FirstArrayItem { path, id } => {
            let (q, key) = Query::at_path(body, path);
            let first = q
                .array_required(&key)?
                .first()
                .ok_or_else(|| Error::missing_values(format!("'{path}' is empty")))?;
            let (q, key) = Query::at_path(first, id);
            q.text_optional(&key)?
                .ok_or_else(|| Error::missing_values(format!("no record id at '{path}[0].{id}'")))
        }
    }
}
