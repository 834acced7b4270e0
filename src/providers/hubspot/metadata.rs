//! Object metadata from the properties API
//!
//! Pipeline and stage properties carry no options of their own; their
//! values come from the pipelines API.

use crate::error::Result;
use crate::handlers::HandlerContext;
use crate::http::HttpRequest;
use crate::jsonquery::Query;
use crate::model::{FieldMetadata, FieldValue, ObjectMetadata, ValueType};
use crate::schema::map_property_type;
use serde_json::Value;
use tracing::debug;

fn is_pipeline(name: &str) -> bool {
    matches!(name, "pipeline" | "hs_pipeline")
}

fn is_stage(name: &str) -> bool {
    matches!(name, "dealstage" | "hs_pipeline_stage")
}

/// `{id, label}` pairs of an array of objects
fn id_labels(items: &[Value]) -> Vec<FieldValue> {
    items
        .iter()
        .filter_map(|item| {
            let value = item.get("id").and_then(Value::as_str)?;
            let label = item.get("label").and_then(Value::as_str).unwrap_or(value);
            Some(FieldValue {
                value: value.to_string(),
                display_value: label.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Default)]
struct Pipelines {
    pipelines: Vec<FieldValue>,
    stages: Vec<FieldValue>,
}

async fn pipelines(hc: &HandlerContext<'_>, object: &str) -> Result<Pipelines> {
    let mut url = hc.module_path("pipelines")?;
    url.push_segment(object);
    let response = hc
        .client
        .send(hc.ctx, HttpRequest::get(&url).headers(hc.headers))
        .await?;
    let results = Query::new(response.require_body()?, &[])
        .array_optional("results")?
        .cloned()
        .unwrap_or_default();

    let mut out = Pipelines {
        pipelines: id_labels(&results),
        ..Default::default()
    };
    for pipeline in &results {
        if let Some(stages) = pipeline.get("stages").and_then(Value::as_array) {
            out.stages.extend(id_labels(stages));
        }
    }
    Ok(out)
}

fn options(property: &Value) -> Vec<FieldValue> {
    property
        .get("options")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|option| {
            let value = option.get("value").and_then(Value::as_str)?;
            let label = option.get("label").and_then(Value::as_str).unwrap_or(value);
            Some(FieldValue {
                value: value.to_string(),
                display_value: label.to_string(),
            })
        })
        .collect()
}

pub(super) async fn describe(
    hc: &HandlerContext<'_>,
    object: &str,
    display_name: &str,
) -> Result<ObjectMetadata> {
    let mut url = hc.module_path("properties")?;
    url.push_segment(object);
    let response = hc
        .client
        .send(hc.ctx, HttpRequest::get(&url).headers(hc.headers))
        .await?;
    let properties = Query::new(response.require_body()?, &[])
        .array_required("results")?
        .clone();

    let needs_pipelines = properties.iter().any(|p| {
        p.get("name")
            .and_then(Value::as_str)
            .is_some_and(|n| is_pipeline(n) || is_stage(n))
    });
    let pipelines = if needs_pipelines {
        pipelines(hc, object).await?
    } else {
        Pipelines::default()
    };

    let mut metadata = ObjectMetadata::new(display_name);
    for property in &properties {
        let q = Query::new(property, &[]);
        let Some(name) = q.string_optional("name")? else {
            continue;
        };
        let label = q.string_optional("label")?.unwrap_or(name);
        let provider_type = q.string_optional("type")?.unwrap_or_default();
        let field_type = q.string_optional("fieldType")?.unwrap_or_default();
        let read_only = property
            .pointer("/modificationMetadata/readOnlyValue")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let (value_type, values) = if is_pipeline(name) {
            (ValueType::SingleSelect, pipelines.pipelines.clone())
        } else if is_stage(name) {
            (ValueType::SingleSelect, pipelines.stages.clone())
        } else {
            (map_property_type(provider_type, field_type), options(property))
        };

        let mut field = FieldMetadata::new(label, value_type, provider_type).read_only(read_only);
        if value_type.is_select() && !values.is_empty() {
            field = field.with_values(values)?;
        }
        metadata.add_field(name.to_lowercase(), field);
    }

    debug!(object, fields = metadata.fields.len(), "described hubspot object");
    Ok(metadata)
}
