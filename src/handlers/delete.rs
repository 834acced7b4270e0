//! Delete handler

use super::context::HandlerContext;
use super::types::ObjectSpec;
use crate::error::{Error, Result};
use crate::http::HttpRequest;
use crate::model::{DeleteParams, DeleteResult};
use crate::types::Method;
use tracing::debug;

/// Delete a record at `<object path>/<record id>`
///
/// Any 2xx status counts as success.
pub async fn delete(hc: &HandlerContext<'_>, spec: &ObjectSpec, params: &DeleteParams) -> Result<DeleteResult> {
    if params.record_id.is_empty() {
        return Err(Error::MissingRecordId);
    }
    let mut url = hc.module_path(spec.path)?;
    url.push_segment(&params.record_id);

    debug!(object = %params.object_name, id = %params.record_id, "deleting record");
    let request = HttpRequest::new(Method::DELETE, &url).headers(hc.headers);
    hc.client.send(hc.ctx, request).await?;

    Ok(DeleteResult { success: true })
}
