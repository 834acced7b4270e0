//! PhoneBurner
//!
//! Every response carries `http_status` in the body, including failures
//! answered with 200. Contacts promote their custom fields to root keys and
//! folders come back as a map keyed by folder id.

use super::{schema_spec, Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::{Marshaller, RecordDecoder, RecordShape};
use crate::error::{ApiErrorKind, Result};
use crate::handlers::{BodyEncoding, IdLocation, ObjectSpec, PageSize, WriteSpec};
use crate::http::{
    DefaultInterpreter, ErrorFormat, ErrorInterpreter, FormatSwitch, ProviderError,
    MESSAGE_FORMAT,
};
use crate::pagination::PaginationRule;
use crate::types::Method;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("{contacts,folders}", Support::CRUD),
    SupportRule::new("{members,dialsession}", Support::READ_ONLY),
];

/// `{"http_status": 404, "status": "error", "message": "..."}`
const ENVELOPE_FORMAT: ErrorFormat =
    ErrorFormat::new("phoneburner-envelope", &["http_status"], parse_envelope);

fn parse_envelope(body: &Value) -> Option<ProviderError> {
    let status = match body.get("http_status")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok())?,
        Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    if status < 400 {
        return None;
    }

    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    let err = ProviderError::new(message).with_status(status);
    Some(match ApiErrorKind::from_status(status) {
        Some(kind) => err.with_kind(kind),
        None => err,
    })
}

const CONTACTS: Marshaller = Marshaller::new(
    RecordShape::CustomFields {
        array: "custom_fields",
        label: "name",
        value: "value",
    },
    "contact_user_id",
);

/// Page counters live next to the records, under the object's wrapper key
fn page_count(wrapper: &'static str) -> PaginationRule {
    let (current, total) = match wrapper {
        "contacts" => ("contacts.page", "contacts.total_pages"),
        "members" => ("members.page", "members.total_pages"),
        _ => ("dialsessions.page", "dialsessions.total_pages"),
    };
    PaginationRule::PageCount {
        current,
        total,
        param: "page",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneBurner;

#[async_trait]
impl Provider for PhoneBurner {
    fn name(&self) -> ProviderName {
        ProviderName::PhoneBurner
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(
            DefaultInterpreter::new(FormatSwitch::new([ENVELOPE_FORMAT, MESSAGE_FORMAT]))
                .with_envelope(FormatSwitch::new([ENVELOPE_FORMAT])),
        )
    }

    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec> {
        let spec = schema_spec(ProviderName::PhoneBurner, module, object)?;
        let page_size = PageSize::new("page_size", 100, 100);

        Ok(match object {
            "contacts" => spec
                .marshaller(CONTACTS)
                .pagination(page_count("contacts"))
                .page_size(page_size)
                .write(
                    WriteSpec::new()
                        .update_with(Method::PUT)
                        .record_id(IdLocation::Path("contacts.contacts.contact_user_id")),
                ),
            "folders" => spec
                .records(RecordDecoder::map_values("folders"))
                .marshaller(Marshaller::new(RecordShape::Plain, "folder_id"))
                .write(
                    WriteSpec::new()
                        .update_with(Method::PUT)
                        .encoding(BodyEncoding::Form)
                        .record_id(IdLocation::FirstMapKey("folders")),
                ),
            "members" => spec
                .marshaller(Marshaller::new(RecordShape::Plain, "user_id"))
                .pagination(page_count("members"))
                .page_size(page_size),
            "dialsession" => spec
                .marshaller(Marshaller::new(RecordShape::Plain, "dialsession_id"))
                .pagination(page_count("dialsessions"))
                .page_size(page_size),
            _ => spec,
        })
    }

    fn single_record_path(&self, object: &str) -> &'static str {
        match object {
            "contacts" => "contacts.contacts",
            "members" => "members.members",
            _ => "",
        }
    }
}
