//! Lemlist
//!
//! Campaigns and schedules page by counters; the activity feeds are bare
//! arrays paged by offset.

use super::{Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::{Marshaller, RecordShape};
use crate::error::{Error, Result};
use crate::handlers::{IdLocation, ObjectSpec, PageSize, WriteSpec};
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, MESSAGE_FORMAT};
use crate::pagination::PaginationRule;
use crate::types::Method;
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("campaigns", Support::READ_ONLY.with(Support::WRITE)),
    SupportRule::new("{schedules,activities,unsubscribes,team}", Support::READ_ONLY),
];

const PAGE_COUNT: PaginationRule = PaginationRule::PageCount {
    current: "pagination.currentPage",
    total: "pagination.totalPage",
    param: "page",
};

const OFFSET: PaginationRule = PaginationRule::OffsetByCount { param: "offset" };

/// Lemlist ids are `_id`
const IDS: Marshaller = Marshaller::new(RecordShape::Plain, "_id");

fn object_table(object: &str) -> Option<ObjectSpec> {
    let spec = match object {
        "campaigns" => ObjectSpec::new("Campaigns", "campaigns", "campaigns")
            .query(&[("version", "v2")])
            .pagination(PAGE_COUNT)
            .page_size(PageSize::new("limit", 100, 100))
            .write(
                WriteSpec::new()
                    .update_with(Method::PATCH)
                    .record_id(IdLocation::Path("_id")),
            ),
        "schedules" => ObjectSpec::new("Schedules", "schedules", "schedules")
            .query(&[("version", "v2")])
            .pagination(PAGE_COUNT)
            .page_size(PageSize::new("limit", 100, 100)),
        "activities" => ObjectSpec::new("Activities", "activities", "")
            .query(&[("version", "v2")])
            .pagination(OFFSET)
            .page_size(PageSize::new("limit", 100, 100)),
        "unsubscribes" => ObjectSpec::new("Unsubscribes", "unsubscribes", "")
            .pagination(OFFSET)
            .page_size(PageSize::new("limit", 100, 100)),
        "team" => ObjectSpec::new("Team", "team", ""),
        _ => return None,
    };
    Some(spec.marshaller(IDS))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lemlist;

#[async_trait]
impl Provider for Lemlist {
    fn name(&self) -> ProviderName {
        ProviderName::Lemlist
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([MESSAGE_FORMAT])))
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        object_table(object).ok_or_else(|| Error::object_not_found(object))
    }
}
