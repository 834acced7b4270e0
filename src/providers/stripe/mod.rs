//! Stripe
//!
//! Form-encoded v1 API. Lists page with `starting_after` the last record id
//! while `has_more` holds; updates are POSTs to the record URL. Webhook
//! endpoints are managed as subscriptions.

mod webhooks;

pub use webhooks::{StripeEvent, StripeWebhooks};

use super::{Provider, ProviderName, Webhooks};
use crate::connector::{EndpointSupport, Support, SupportRule};
use crate::error::{Error, Result};
use crate::handlers::{BodyEncoding, Incremental, ObjectSpec, PageSize, WriteSpec};
use crate::http::{DefaultInterpreter, ErrorInterpreter, FormatSwitch, ERROR_OBJECT_FORMAT};
use crate::pagination::PaginationRule;
use crate::types::{CursorFormat, Method};
use async_trait::async_trait;
use std::sync::Arc;

const SUPPORT: &[SupportRule] = &[
    SupportRule::new(
        "{customers,products,coupons,plans,subscriptions,invoices}",
        Support::CRUD.with(Support::SUBSCRIBE),
    ),
    SupportRule::new(
        "{prices,charges,payment_intents}",
        Support::READ_ONLY.with(Support::WRITE).with(Support::SUBSCRIBE),
    ),
    SupportRule::new("refunds", Support::READ_ONLY.with(Support::WRITE)),
    SupportRule::new("webhook_endpoints", Support::READ_ONLY.with(Support::DELETE)),
    SupportRule::new("{balance_transactions,events}", Support::READ_ONLY),
];

const PAGE: PaginationRule = PaginationRule::LastIdCursor {
    has_more: "has_more",
    param: "starting_after",
};

const CREATED_RANGE: Incremental = Incremental::QueryRange {
    since: "created[gte]",
    until: Some("created[lt]"),
    format: CursorFormat::Unix,
};

/// Object name, display name, whether it is written and whether it is
/// filtered by creation time
const OBJECTS: &[(&str, &str, bool, bool)] = &[
    ("customers", "Customers", true, true),
    ("products", "Products", true, true),
    ("prices", "Prices", true, true),
    ("coupons", "Coupons", true, true),
    ("plans", "Plans", true, true),
    ("subscriptions", "Subscriptions", true, true),
    ("invoices", "Invoices", true, true),
    ("charges", "Charges", true, true),
    ("payment_intents", "Payment Intents", true, true),
    ("refunds", "Refunds", true, true),
    ("balance_transactions", "Balance Transactions", false, true),
    ("events", "Events", false, true),
    ("webhook_endpoints", "Webhook Endpoints", false, false),
];

fn object_table(object: &str) -> Option<ObjectSpec> {
    let &(name, display, writable, ranged) = OBJECTS.iter().find(|(name, ..)| *name == object)?;

    let mut spec = ObjectSpec::new(display, name, "data")
        .pagination(PAGE)
        .page_size(PageSize::new("limit", 10, 100));
    if ranged {
        spec = spec.incremental(CREATED_RANGE);
    }
    if writable {
        spec = spec.write(
            WriteSpec::new()
                .update_with(Method::POST)
                .encoding(BodyEncoding::Form),
        );
    }
    Some(spec)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Stripe;

#[async_trait]
impl Provider for Stripe {
    fn name(&self) -> ProviderName {
        ProviderName::Stripe
    }

    fn support(&self, _module: &str) -> EndpointSupport {
        EndpointSupport::new(SUPPORT)
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::new(FormatSwitch::new([ERROR_OBJECT_FORMAT])))
    }

    fn object_spec(&self, _module: &str, object: &str) -> Result<ObjectSpec> {
        object_table(object).ok_or_else(|| Error::object_not_found(object))
    }

    fn webhooks(&self) -> Option<&dyn Webhooks> {
        Some(&StripeWebhooks)
    }
}

#[cfg(test)]
mod tests;
