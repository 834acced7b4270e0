//! Xero
//!
//! Accounting API. Calls are scoped to an organisation by the
//! `Xero-Tenant-Id` header, taken from the `tenantId` metadata or discovered
//! from the connections endpoint. Incremental reads use `If-Modified-Since`.

use super::{Provider, ProviderName};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::decode::{Marshaller, RecordShape};
use crate::error::{Error, Result};
use crate::handlers::{
    self, BodyWrap, HandlerContext, IdLocation, Incremental, ObjectSpec, PageSize, WriteSpec,
};
use crate::http::{
    DefaultInterpreter, ErrorFormat, ErrorInterpreter, FormatSwitch, HttpRequest, ProviderError,
    MESSAGE_FORMAT,
};
use crate::jsonquery::Query;
use crate::model::{PostAuthInfo, ReadParams, ReadResultRow};
use crate::pagination::PaginationRule;
use crate::types::{Metadata, Method};
use crate::urlbuilder::Headers;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const TENANT_HEADER: &str = "Xero-Tenant-Id";
const TENANT_KEY: &str = "tenantId";

const SUPPORT: &[SupportRule] = &[
    SupportRule::new("items", Support::CRUD),
    SupportRule::new(
        "{contacts,invoices,accounts,payments,bank_transactions,credit_notes,purchase_orders,quotes,manual_journals}",
        Support::READ_ONLY.with(Support::WRITE),
    ),
    SupportRule::new(
        "{tax_rates,currencies,tracking_categories,users}",
        Support::READ_ONLY,
    ),
];

/// `{"Type": "ValidationException", "Message": "...", "Elements": [...]}`
const EXCEPTION_FORMAT: ErrorFormat =
    ErrorFormat::new("xero-exception", &["Message"], parse_exception);

fn parse_exception(body: &Value) -> Option<ProviderError> {
    let message = body.get("Message")?.as_str()?;
    let details: Vec<&str> = body
        .get("Elements")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|el| el.get("ValidationErrors").and_then(Value::as_array))
        .flatten()
        .filter_map(|v| v.get("Message").and_then(Value::as_str))
        .collect();

    let message = if details.is_empty() {
        message.to_string()
    } else {
        format!("{message}: {}", details.join("; "))
    };
    Some(ProviderError::new(message))
}

/// One accounting object: name, path (also the records key) and id field
struct XeroObject {
    name: &'static str,
    path: &'static str,
    id: &'static str,
    paged: bool,
    writable: bool,
}

const fn object(name: &'static str, path: &'static str, id: &'static str) -> XeroObject {
    XeroObject {
        name,
        path,
        id,
        paged: true,
        writable: true,
    }
}

const fn reference(name: &'static str, path: &'static str, id: &'static str) -> XeroObject {
    XeroObject {
        name,
        path,
        id,
        paged: false,
        writable: false,
    }
}

const OBJECTS: &[XeroObject] = &[
    object("contacts", "Contacts", "ContactID"),
    object("invoices", "Invoices", "InvoiceID"),
    object("payments", "Payments", "PaymentID"),
    object("bank_transactions", "BankTransactions", "BankTransactionID"),
    object("credit_notes", "CreditNotes", "CreditNoteID"),
    object("purchase_orders", "PurchaseOrders", "PurchaseOrderID"),
    object("quotes", "Quotes", "QuoteID"),
    object("manual_journals", "ManualJournals", "ManualJournalID"),
    XeroObject {
        paged: false,
        ..object("accounts", "Accounts", "AccountID")
    },
    XeroObject {
        paged: false,
        ..object("items", "Items", "ItemID")
    },
    reference("tax_rates", "TaxRates", "TaxType"),
    reference("currencies", "Currencies", "Code"),
    reference("tracking_categories", "TrackingCategories", "TrackingCategoryID"),
    reference("users", "Users", "UserID"),
];

impl XeroObject {
    fn spec(&self) -> ObjectSpec {
        let mut spec = ObjectSpec::new(self.path, self.path, self.path)
            .marshaller(Marshaller::new(RecordShape::Plain, self.id))
            .incremental(Incremental::IfModifiedSince);
        if self.paged {
            spec = spec
                .pagination(PaginationRule::PageCount {
                    current: "pagination.page",
                    total: "pagination.pageCount",
                    param: "page",
                })
                .page_size(PageSize::new("pageSize", 100, 1000));
        }
        if self.writable {
            spec = spec.write(
                WriteSpec::new()
                    .update_with(Method::POST)
                    .wrap(BodyWrap::ArrayUnder(self.path))
                    .record_id(IdLocation::FirstArrayItem {
                        path: self.path,
                        id: self.id,
                    }),
            );
        }
        spec
    }
}

/// Tenant id from metadata, else from post-auth info
fn tenant_id<'a>(metadata: &'a Metadata, post_auth: Option<&'a PostAuthInfo>) -> Option<&'a str> {
    metadata
        .get(TENANT_KEY)
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .or_else(|| post_auth.and_then(|info| info.get(TENANT_KEY).ok()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Xero;

#[async_trait]
impl Provider for Xero {
    fn name(&self) -> ProviderName {
        ProviderName::Xero
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([
            EXCEPTION_FORMAT,
            MESSAGE_FORMAT,
        ])))
    }

    fn common_headers(
        &self,
        _module: &str,
        metadata: &Metadata,
        post_auth: Option<&PostAuthInfo>,
    ) -> Result<Headers> {
        let mut headers = Headers::new();
        headers.set("Accept", "application/json");
        if let Some(tenant) = tenant_id(metadata, post_auth) {
            headers.set(TENANT_HEADER, tenant);
        }
        Ok(headers)
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        OBJECTS
            .iter()
            .find(|o| o.name == object)
            .map(XeroObject::spec)
            .ok_or_else(|| Error::object_not_found(object))
    }

    /// `If-Modified-Since` has no upper bound
    fn validate_read(&self, _module: &str, params: &ReadParams) -> Result<()> {
        if params.until.is_some() && params.since.is_none() {
            return Err(Error::invalid_params("xero reads accept until only together with since"));
        }
        Ok(())
    }

    fn requires_post_auth(&self, metadata: &Metadata) -> bool {
        tenant_id(metadata, None).is_none()
    }

    /// First organisation connected to the token
    async fn post_auth_info(&self, hc: &HandlerContext<'_>) -> Result<PostAuthInfo> {
        let url = hc.base_path("connections")?;
        let response = hc.client.send(hc.ctx, HttpRequest::get(&url)).await?;
        let connections = response
            .require_body()?
            .as_array()
            .ok_or_else(|| Error::missing_values("connections is not an array"))?;

        let connection = connections
            .iter()
            .find(|c| c.get("tenantType").and_then(Value::as_str) == Some("ORGANISATION"))
            .or_else(|| connections.first())
            .ok_or_else(|| Error::missing_values("no Xero tenant connected"))?;

        let tenant = Query::new(connection, &[]).string_required(TENANT_KEY)?;
        debug!(tenant, "resolved xero tenant");
        Ok(PostAuthInfo::from_pairs([(TENANT_KEY, tenant)]))
    }

    async fn get_record(
        &self,
        hc: &HandlerContext<'_>,
        object: &str,
        record_id: &str,
    ) -> Result<ReadResultRow> {
        // by-id lookups still answer with a one-element collection
        let spec = self.object_spec(hc.module, object)?;
        handlers::get_listed_record(hc, &spec, record_id).await
    }
}
