//! Chorus
//!
//! Two generations of API behind one base URL: `v3/engagements` pages with a
//! continuation key, while the `v1` objects are JSON:API documents whose
//! records must carry `attributes`.

use super::{Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::{Marshaller, RecordShape};
use crate::error::{Error, Result};
use crate::handlers::{Incremental, ObjectSpec, PageSize};
use crate::http::{
    DefaultInterpreter, ErrorInterpreter, FormatSwitch, ERRORS_ARRAY_FORMAT, MESSAGE_FORMAT,
};
use crate::pagination::PaginationRule;
use crate::types::CursorFormat;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[SupportRule::new(
    "{engagements,users,teams,scorecards,playlists}",
    Support::READ_ONLY,
)];

const JSON_API: Marshaller = Marshaller::new(
    RecordShape::Nested {
        key: "attributes",
        required: true,
    },
    "id",
);

fn object_table(object: &str) -> Option<ObjectSpec> {
    let v1 = |name: &'static str, path: &'static str| {
        ObjectSpec::new(name, path, "data")
            .marshaller(JSON_API)
            .pagination(PaginationRule::RelativeUrlField { path: "links.next" })
    };

    let spec = match object {
        "engagements" => ObjectSpec::new("Engagements", "v3/engagements", "engagements")
            .marshaller(Marshaller::new(RecordShape::Plain, "engagement_id"))
            .pagination(PaginationRule::Cursor {
                path: "continuation_key",
                param: "continuation_key",
                has_more: None,
            })
            .page_size(PageSize::new("max_hits", 100, 100))
            .incremental(Incremental::QueryRange {
                since: "min_date",
                until: Some("max_date"),
                format: CursorFormat::Iso8601,
            }),
        "users" => v1("Users", "v1/users"),
        "teams" => v1("Teams", "v1/teams"),
        "scorecards" => v1("Scorecards", "v1/scorecards"),
        "playlists" => v1("Playlists", "v1/playlists"),
        _ => return None,
    };
    Some(spec)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Chorus;

#[async_trait]
impl Provider for Chorus {
    fn name(&self) -> ProviderName {
        ProviderName::Chorus
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([
            ERRORS_ARRAY_FORMAT,
            MESSAGE_FORMAT,
        ])))
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        object_table(object).ok_or_else(|| Error::object_not_found(object))
    }

    fn single_record_path(&self, object: &str) -> &'static str {
        match object {
            "engagements" => "",
            _ => "data",
        }
    }
}
