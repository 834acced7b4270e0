//! RevenueCat
//!
//! Project-scoped v2 API; every object path carries the `project_id`
//! metadata value. Next pages are relative links.

use super::{schema_spec, Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::Result;
use crate::handlers::{ObjectSpec, PageSize, WriteSpec};
use crate::types::Method;
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, MESSAGE_FORMAT};
use crate::pagination::PaginationRule;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("{customers,entitlements,offerings}", Support::CRUD),
    SupportRule::new("{products,apps}", Support::READ_ONLY.with(Support::WRITE)),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RevenueCat;

#[async_trait]
impl Provider for RevenueCat {
    fn name(&self) -> ProviderName {
        ProviderName::RevenueCat
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn required_metadata(&self) -> &'static [&'static str] {
        &["project_id"]
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([MESSAGE_FORMAT])))
    }

    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec> {
        Ok(schema_spec(ProviderName::RevenueCat, module, object)?
            .pagination(PaginationRule::RelativeUrlField { path: "next_page" })
            .page_size(PageSize::new("limit", 20, 1000))
            .write(WriteSpec::new().update_with(Method::POST)))
    }
}
