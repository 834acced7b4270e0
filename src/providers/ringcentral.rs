//! RingCentral
//!
//! Account-scoped REST API under `restapi/v1.0`; `~` stands for the
//! authenticated account and extension.

use super::{Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::{Error, Result};
use crate::handlers::{Incremental, ObjectSpec, PageSize, WriteSpec};
use crate::http::{DefaultInterpreter, ErrorFormat, ErrorInterpreter, FormatSwitch, ProviderError};
use crate::pagination::PaginationRule;
use crate::types::{CursorFormat, Method};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("contacts", Support::CRUD),
    SupportRule::new(
        "{extensions,call-log,messages,call-queues,users}",
        Support::READ_ONLY,
    ),
];

/// `{"errorCode": "CMN-102", "message": "..."}`
const ERROR_CODE_FORMAT: ErrorFormat =
    ErrorFormat::new("ringcentral", &["errorCode", "message"], parse_error_code);

fn parse_error_code(body: &Value) -> Option<ProviderError> {
    let code = body.get("errorCode")?.as_str()?;
    let message = body.get("message")?.as_str()?;
    Some(ProviderError::new(format!("{code}: {message}")))
}

const NEXT_PAGE: PaginationRule = PaginationRule::UrlField {
    path: "navigation.nextPage.uri",
};

const PAGE_SIZE: PageSize = PageSize::new("perPage", 100, 1000);

fn object_table(object: &str) -> Option<ObjectSpec> {
    let spec = match object {
        "extensions" => ObjectSpec::new("Extensions", "account/~/extension", "records"),
        "call-log" => ObjectSpec::new("Call Log", "account/~/call-log", "records").incremental(
            Incremental::QueryRange {
                since: "dateFrom",
                until: Some("dateTo"),
                format: CursorFormat::Iso8601Millis,
            },
        ),
        "messages" => ObjectSpec::new("Messages", "account/~/extension/~/message-store", "records")
            .incremental(Incremental::QueryRange {
                since: "dateFrom",
                until: Some("dateTo"),
                format: CursorFormat::Iso8601Millis,
            }),
        "contacts" => ObjectSpec::new(
            "Contacts",
            "account/~/extension/~/address-book/contact",
            "records",
        )
        .write(WriteSpec::new().update_with(Method::PUT)),
        "call-queues" => ObjectSpec::new("Call Queues", "account/~/call-queues", "records"),
        "users" => ObjectSpec::new("Users", "account/~/directory/entries", "records"),
        _ => return None,
    };
    Some(spec.pagination(NEXT_PAGE).page_size(PAGE_SIZE))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RingCentral;

#[async_trait]
impl Provider for RingCentral {
    fn name(&self) -> ProviderName {
        ProviderName::RingCentral
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([ERROR_CODE_FORMAT])))
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        object_table(object).ok_or_else(|| Error::object_not_found(object))
    }
}
