//! Talkdesk
//!
//! HAL responses: records under `_embedded`, next page at `_links.next.href`.

use super::{schema_spec, Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::Result;
use crate::handlers::{Incremental, ObjectSpec, PageSize, WriteSpec};
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, MESSAGE_FORMAT};
use crate::pagination::PaginationRule;
use crate::types::CursorFormat;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("{record-lists,do-not-call-lists}", Support::CRUD),
    SupportRule::new("contacts", Support::READ_ONLY.with(Support::WRITE)),
    SupportRule::new("users", Support::READ_ONLY),
];

/// Range parameters, one pair per object
fn time_range(object: &str) -> Incremental {
    let (since, until) = match object {
        "contacts" => ("updated_at_from", "updated_at_to"),
        "record-lists" => ("created_at_from", "created_at_to"),
        _ => return Incremental::None,
    };
    Incremental::QueryRange {
        since,
        until: Some(until),
        format: CursorFormat::Iso8601,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Talkdesk;

#[async_trait]
impl Provider for Talkdesk {
    fn name(&self) -> ProviderName {
        ProviderName::Talkdesk
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([MESSAGE_FORMAT])))
    }

    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec> {
        let spec = schema_spec(ProviderName::Talkdesk, module, object)?
            .pagination(PaginationRule::UrlField {
                path: "_links.next.href",
            })
            .page_size(PageSize::new("per_page", 50, 100))
            .incremental(time_range(object));

        Ok(match object {
            "users" => spec,
            _ => spec.write(WriteSpec::new()),
        })
    }
}
