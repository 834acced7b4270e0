//! Supersend
//!
//! Outreach campaigns, contacts, senders and labels; offset pagination.

use super::{schema_spec, Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::Result;
use crate::handlers::{IdLocation, ObjectSpec, PageSize, WriteSpec};
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, ERROR_STRING_FORMAT, MESSAGE_FORMAT};
use crate::pagination::PaginationRule;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("{contacts,labels}", Support::CRUD),
    SupportRule::new("{campaigns,senders}", Support::READ_ONLY),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Supersend;

#[async_trait]
impl Provider for Supersend {
    fn name(&self) -> ProviderName {
        ProviderName::Supersend
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([
            ERROR_STRING_FORMAT,
            MESSAGE_FORMAT,
        ])))
    }

    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec> {
        let spec = schema_spec(ProviderName::Supersend, module, object)?
            .pagination(PaginationRule::OffsetByCount { param: "offset" })
            .page_size(PageSize::new("limit", 50, 100));

        Ok(match object {
            "contacts" | "labels" => {
                spec.write(WriteSpec::new().record_id(IdLocation::Path("data.id")))
            }
            _ => spec,
        })
    }

    fn single_record_path(&self, _object: &str) -> &'static str {
        "data"
    }
}
