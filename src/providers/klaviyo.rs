//! Klaviyo
//!
//! JSON:API resources under `/api`, versioned by the `revision` header (the
//! module id). Records keep their `attributes` nested in `raw`; projections
//! read them flattened. Incremental reads use `filter=greater-than(...)`.

use super::{schema_spec, Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::{Marshaller, RecordShape};
use crate::error::Result;
use crate::handlers::{IdLocation, Incremental, ObjectSpec, PageSize, WriteSpec};
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, ERRORS_ARRAY_FORMAT};
use crate::model::PostAuthInfo;
use crate::pagination::PaginationRule;
use crate::types::{CursorFormat, Metadata};
use crate::urlbuilder::Headers;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("{campaigns,tags,lists,segments,templates,flows}", Support::CRUD),
    SupportRule::new("{profiles,events}", Support::READ_ONLY.with(Support::WRITE)),
    SupportRule::new("metrics", Support::READ_ONLY),
];

const FLATTEN: Marshaller = Marshaller::new(
    RecordShape::Nested {
        key: "attributes",
        required: false,
    },
    "id",
);

/// Field used for `since`/`until`, per object
fn since_field(object: &str) -> Option<&'static str> {
    match object {
        "campaigns" => Some("updated_at"),
        "events" => Some("datetime"),
        "lists" | "profiles" | "segments" | "flows" | "templates" => Some("updated"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Klaviyo;

#[async_trait]
impl Provider for Klaviyo {
    fn name(&self) -> ProviderName {
        ProviderName::Klaviyo
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([ERRORS_ARRAY_FORMAT])))
    }

    fn common_headers(
        &self,
        module: &str,
        _metadata: &Metadata,
        _post_auth: Option<&PostAuthInfo>,
    ) -> Result<Headers> {
        let mut headers = Headers::new();
        headers.set("revision", module);
        Ok(headers)
    }

    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec> {
        let mut spec = schema_spec(ProviderName::Klaviyo, module, object)?
            .marshaller(FLATTEN)
            .pagination(PaginationRule::UrlField { path: "links.next" });

        spec = match since_field(object) {
            Some(field) => spec.incremental(Incremental::FilterExpression {
                field,
                format: CursorFormat::Iso8601,
            }),
            None => spec.filter_param("filter"),
        };

        if matches!(object, "profiles" | "segments" | "events") {
            spec = spec.page_size(PageSize::new("page[size]", 100, 100));
        }

        let write = WriteSpec::new().record_id(IdLocation::Path("data.id"));
        spec = match object {
            "metrics" => spec,
            // event ingestion answers 202 with no body
            "events" => spec.write(write.create_only().record_id(IdLocation::None)),
            _ => spec.write(write),
        };

        Ok(spec)
    }

    fn single_record_path(&self, _object: &str) -> &'static str {
        "data"
    }
}
