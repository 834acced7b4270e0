//! Loxo
//!
//! Every path is scoped by the agency slug from metadata. People and
//! companies scroll with `scroll_id`; jobs page by counters.

use super::{snake_case, Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::{Error, Result};
use crate::handlers::{BodyWrap, IdLocation, ObjectSpec, PageSize, WriteSpec};
use crate::http::{
    DefaultInterpreter, ErrorInterpreter, FormatSwitch, ERRORS_ARRAY_FORMAT, MESSAGE_FORMAT,
};
use crate::model::Entity;
use crate::pagination::PaginationRule;
use crate::types::Method;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("{people,companies,jobs}", Support::CRUD),
    SupportRule::new("{users,activity_types,job_statuses}", Support::READ_ONLY),
];

const SCROLL: PaginationRule = PaginationRule::Cursor {
    path: "scroll_id",
    param: "scroll_id",
    has_more: None,
};

/// Writes wrap the record under its singular name and echo it back there
const fn write_as(key: &'static str, id: &'static str) -> WriteSpec {
    WriteSpec::new()
        .update_with(Method::PUT)
        .wrap(BodyWrap::Key(key))
        .record_id(IdLocation::Path(id))
}

fn object_table(object: &str) -> Option<ObjectSpec> {
    let spec = match object {
        "people" => ObjectSpec::new("People", "{{ metadata.agencySlug }}/people", "people")
            .pagination(SCROLL)
            .page_size(PageSize::new("per_page", 100, 100))
            .write(write_as("person", "person.id")),
        "companies" => {
            ObjectSpec::new("Companies", "{{ metadata.agencySlug }}/companies", "companies")
                .pagination(SCROLL)
                .page_size(PageSize::new("per_page", 100, 100))
                .write(write_as("company", "company.id"))
        }
        "jobs" => ObjectSpec::new("Jobs", "{{ metadata.agencySlug }}/jobs", "results")
            .pagination(PaginationRule::PageCount {
                current: "current_page",
                total: "total_pages",
                param: "page",
            })
            .page_size(PageSize::new("per_page", 100, 100))
            .write(write_as("job", "job.id")),
        "users" => ObjectSpec::new("Users", "{{ metadata.agencySlug }}/users", "users"),
        "activity_types" => {
            ObjectSpec::new("Activity Types", "{{ metadata.agencySlug }}/activity_types", "")
        }
        "job_statuses" => {
            ObjectSpec::new("Job Statuses", "{{ metadata.agencySlug }}/job_statuses", "")
        }
        _ => return None,
    };
    Some(spec)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Loxo;

#[async_trait]
impl Provider for Loxo {
    fn name(&self) -> ProviderName {
        ProviderName::Loxo
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn required_metadata(&self) -> &'static [&'static str] {
        &["agencySlug"]
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

    fn normalize_entity_name(&self, entity: Entity, input: &str) -> String {
        match entity {
            Entity::Object => snake_case(input),
            Entity::Field => input.to_lowercase(),
        }
    }
}
