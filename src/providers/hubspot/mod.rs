//! HubSpot CRM
//!
//! CRM v3 objects under `crm/v3`. Plain reads list `objects/<name>`;
//! incremental reads, long property lists and numeric paging tokens go
//! through the search endpoint instead. Records keep their `properties`
//! nested in `raw` and read them flattened.

mod associations;
mod batch;
mod metadata;
mod search;
mod webhooks;

pub use webhooks::{HubspotEvent, HubspotWebhooks};

use super::{Provider, ProviderName, Webhooks};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::{Marshaller, RecordShape};
use crate::error::{ApiErrorKind, Error, Result};
use crate::handlers::{
    self, build_read_request, parse_read_response, HandlerContext, IdLocation, ObjectSpec,
    PageSize, ReadRequest, WriteSpec,
};
use crate::http::{
    DefaultInterpreter, ErrorFormat, ErrorInterpreter, FormatSwitch, HttpRequest, ProviderError,
};
use crate::jsonquery::Query;
use crate::model::{
    BatchWriteParams, BatchWriteResult, Entity, ObjectMetadata, PostAuthInfo, ReadParams,
    ReadResult, RecordCountParams, RecordCountResult, WriteParams, WriteResult,
};
use crate::pagination::PaginationRule;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub(crate) const PORTAL_KEY: &str = "portalId";

const CORE: Support = Support::CRUD
    .with(Support::BATCH_WRITE)
    .with(Support::RECORD_COUNT);

const SUPPORT: &[SupportRule] = &[SupportRule::new(
    "{contacts,companies,deals,tickets,products,line_items,quotes,calls,emails,meetings,notes,tasks}",
    CORE,
)];

/// Object name, display name and path relative to `crm/v3`
const OBJECTS: &[(&str, &str, &str)] = &[
    ("contacts", "Contacts", "objects/contacts"),
    ("companies", "Companies", "objects/companies"),
    ("deals", "Deals", "objects/deals"),
    ("tickets", "Tickets", "objects/tickets"),
    ("products", "Products", "objects/products"),
    ("line_items", "Line Items", "objects/line_items"),
    ("quotes", "Quotes", "objects/quotes"),
    ("calls", "Calls", "objects/calls"),
    ("emails", "Emails", "objects/emails"),
    ("meetings", "Meetings", "objects/meetings"),
    ("notes", "Notes", "objects/notes"),
    ("tasks", "Tasks", "objects/tasks"),
];

pub(crate) const PROPERTIES: Marshaller = Marshaller::new(
    RecordShape::Nested {
        key: "properties",
        required: false,
    },
    "id",
);

/// `{"status": "error", "message": "...", "category": "VALIDATION_ERROR"}`
const HUBSPOT_FORMAT: ErrorFormat =
    ErrorFormat::new("hubspot", &["message", "category"], parse_hubspot_error);

fn parse_hubspot_error(body: &Value) -> Option<ProviderError> {
    let message = body.get("message")?.as_str()?;
    let category = body.get("category")?.as_str()?;
    let err = ProviderError::new(format!("{category}: {message}"));
    Some(match category {
        "OBJECT_NOT_FOUND" => err.with_kind(ApiErrorKind::NotFound),
        "RATE_LIMITS" => err.with_kind(ApiErrorKind::LimitExceeded),
        "MISSING_SCOPES" => err.with_kind(ApiErrorKind::Forbidden),
        _ => err,
    })
}

/// English plural of a singular object name
pub(crate) fn plural(name: &str) -> String {
    if name.ends_with('s') {
        name.to_string()
    } else if let Some(stem) = name.strip_suffix('y') {
        format!("{stem}ies")
    } else {
        format!("{name}s")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Hubspot;

impl Hubspot {
    /// One page from the list endpoint
    async fn list(
        &self,
        hc: &HandlerContext<'_>,
        spec: &ObjectSpec,
        params: &ReadParams,
    ) -> Result<ReadResult> {
        let ReadRequest {
            mut request,
            page_size,
            offset,
        } = build_read_request(hc, spec, params)?;

        // next-page links do not repeat the property list
        let has = |url: &url::Url, key: &str| url.query_pairs().any(|(k, _)| k == key);
        if !params.fields.is_empty() && !has(&request.url, "properties") {
            let properties = search::property_list(params);
            request.url.query_pairs_mut().append_pair("properties", &properties);
        }
        if params.deleted && !has(&request.url, "archived") {
            request.url.query_pairs_mut().append_pair("archived", "true");
        }

        let url = request.url.clone();
        debug!(object = %params.object_name, %url, "listing hubspot records");
        let response = hc.client.send(hc.ctx, request).await?;
        parse_read_response(spec, &response, &url, page_size, offset, &params.lowercase_fields())
    }
}

#[async_trait]
impl Provider for Hubspot {
    fn name(&self) -> ProviderName {
        ProviderName::Hubspot
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([HUBSPOT_FORMAT])))
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        let &(_, display, path) = OBJECTS
            .iter()
            .find(|(name, ..)| *name == object)
            .ok_or_else(|| Error::object_not_found(object))?;

        Ok(ObjectSpec::new(display, path, "results")
            .marshaller(PROPERTIES)
            .pagination(PaginationRule::UrlField {
                path: "paging.next.link",
            })
            .page_size(PageSize::new("limit", 100, 100))
            .write(WriteSpec::new().record_id(IdLocation::Path("id"))))
    }

    /// Portal (account) id
    async fn post_auth_info(&self, hc: &HandlerContext<'_>) -> Result<PostAuthInfo> {
        let url = hc.base_path("account-info/v3/details")?;
        let response = hc.client.send(hc.ctx, HttpRequest::get(&url).headers(hc.headers)).await?;
        let portal = Query::new(response.require_body()?, &[])
            .text_optional(PORTAL_KEY)?
            .ok_or_else(|| Error::missing_values("account details have no portalId"))?;
        debug!(portal, "resolved hubspot portal");
        Ok(PostAuthInfo::from_pairs([(PORTAL_KEY, portal)]))
    }

    fn validate_read(&self, _module: &str, params: &ReadParams) -> Result<()> {
        search::check_limit(&params.next_page)
    }

    async fn read(&self, hc: &HandlerContext<'_>, params: &ReadParams) -> Result<ReadResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        let mut result = if search::should_search(params) {
            search::search(hc, &spec, params).await?
        } else {
            self.list(hc, &spec, params).await?
        };

        if !params.associated_objects.is_empty() {
            associations::attach(
                hc,
                &params.object_name,
                &params.associated_objects,
                &mut result.data,
            )
            .await?;
        }
        Ok(result)
    }

    /// Record data goes under `properties`, associations beside it
    async fn write(&self, hc: &HandlerContext<'_>, params: &WriteParams) -> Result<WriteResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        let mut wrapped = params.clone();
        wrapped.record_data = json!({ "properties": params.record_data });
        handlers::write(hc, &spec, &wrapped).await
    }

    async fn batch_write(
        &self,
        hc: &HandlerContext<'_>,
        params: &BatchWriteParams,
    ) -> Result<BatchWriteResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        batch::batch_write(hc, &spec, params).await
    }

    async fn record_count(
        &self,
        hc: &HandlerContext<'_>,
        params: &RecordCountParams,
    ) -> Result<RecordCountResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        search::count(hc, &spec, params).await
    }

    async fn object_metadata(&self, hc: &HandlerContext<'_>, object: &str) -> Result<ObjectMetadata> {
        let spec = self.object_spec(hc.module, object)?;
        metadata::describe(hc, object, spec.name).await
    }

    fn webhooks(&self) -> Option<&dyn Webhooks> {
        Some(&HubspotWebhooks)
    }

    /// Objects are plural and lowercase (`Contact` -> `contacts`); fields lowercase
    fn normalize_entity_name(&self, entity: Entity, input: &str) -> String {
        let lower = input.trim().to_lowercase();
        match entity {
            Entity::Object => plural(&lower),
            Entity::Field => lower,
        }
    }
}
