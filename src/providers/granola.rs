//! Granola
//!
//! Read-only meeting notes with cursor pagination.

use super::{schema_spec, Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::Result;
use crate::handlers::{Incremental, ObjectSpec, PageSize};
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, MESSAGE_FORMAT};
use crate::pagination::PaginationRule;
use crate::types::CursorFormat;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[SupportRule::new("notes", Support::READ_ONLY)];

#[derive(Debug, Clone, Copy, Default)]
pub struct Granola;

#[async_trait]
impl Provider for Granola {
    fn name(&self) -> ProviderName {
        ProviderName::Granola
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([MESSAGE_FORMAT])))
    }

    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec> {
        Ok(schema_spec(ProviderName::Granola, module, object)?
            .pagination(PaginationRule::Cursor {
                path: "cursor",
                param: "cursor",
                has_more: Some("hasMore"),
            })
            .page_size(PageSize::new("page_size", 10, 30))
            .incremental(Incremental::QueryRange {
                since: "created_after",
                until: Some("created_before"),
                format: CursorFormat::Iso8601,
            }))
    }
}
