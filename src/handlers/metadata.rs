//! Metadata handlers

use super::context::HandlerContext;
use super::read::read;
use super::types::ObjectSpec;
use crate::error::{Error, Result};
use crate::model::{ObjectMetadata, ReadParams};
use crate::schema::{infer_object_metadata, provider_schemas};

/// Metadata from the provider's embedded schema
pub fn static_metadata(provider: &str, module: &str, object: &str) -> Result<ObjectMetadata> {
    let schemas = provider_schemas(provider)?.ok_or_else(|| Error::object_not_found(object))?;
    schemas.lookup(module, object)?.to_metadata()
}

/// Metadata inferred from one sampled record
pub async fn sample_metadata(hc: &HandlerContext<'_>, spec: &ObjectSpec, object: &str) -> Result<ObjectMetadata> {
    let params = ReadParams::new(object).page_size(1);
    let result = read(hc, spec, &params).await?;

    let row = result
        .data
        .into_iter()
        .next()
        .ok_or_else(|| Error::missing_values(format!("no '{object}' record to sample fields from")))?;

    let view = spec.marshaller.shape.project(&row.raw)?;
    Ok(infer_object_metadata(spec.name, &view))
}
