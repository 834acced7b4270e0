//! Provider adapter traits

use super::ProviderName;
use crate::connector::EndpointSupport;
use crate::error::{Error, ErrorKind, Result};
use crate::handlers::{self, HandlerContext, ObjectSpec};
use crate::http::{DefaultInterpreter, ErrorInterpreter};
use crate::model::{
    BatchWriteParams, BatchWriteResult, DeleteParams, DeleteResult, Entity, ObjectMetadata,
    Operation, PostAuthInfo, ReadParams, ReadResult, ReadResultRow, RecordCountParams,
    RecordCountResult, SubscribeParams, SubscriptionEvent, SubscriptionEventType,
    SubscriptionResult, WebhookRequest, WriteParams, WriteResult,
};
use crate::schema::provider_schemas;
use crate::types::Metadata;
use crate::urlbuilder::Headers;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A provider adapter
///
/// Most providers only describe their objects through [`Provider::object_spec`]
/// and inherit the generic handlers; the rest override single operations.
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    fn name(&self) -> ProviderName;

    /// Supported operations per object for a module
    fn support(&self, module: &str) -> EndpointSupport;

    /// Metadata keys that must be present at construction
    fn required_metadata(&self) -> &'static [&'static str] {
        &[]
    }

    fn error_interpreter(&self) -> Arc<dyn ErrorInterpreter> {
        Arc::new(DefaultInterpreter::default())
    }

    /// Headers sent with every request (API revision, tenant id)
    fn common_headers(
        &self,
        _module: &str,
        _metadata: &Metadata,
        _post_auth: Option<&PostAuthInfo>,
    ) -> Result<Headers> {
        Ok(Headers::new())
    }

    /// Declarative description of an object
    fn object_spec(&self, module: &str, object: &str) -> Result<ObjectSpec>;

    /// True when operations need post-auth info discovered first
    fn requires_post_auth(&self, _metadata: &Metadata) -> bool {
        false
    }

    /// Probe the provider for catalog variables
    async fn post_auth_info(&self, _hc: &HandlerContext<'_>) -> Result<PostAuthInfo> {
        Ok(PostAuthInfo::default())
    }

    /// True when reads may omit `fields`
    fn fields_optional(&self) -> bool {
        false
    }

    /// Provider-specific read checks, run before any I/O
    fn validate_read(&self, _module: &str, _params: &ReadParams) -> Result<()> {
        Ok(())
    }

    async fn read(&self, hc: &HandlerContext<'_>, params: &ReadParams) -> Result<ReadResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        handlers::read(hc, &spec, params).await
    }

    async fn write(&self, hc: &HandlerContext<'_>, params: &WriteParams) -> Result<WriteResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        handlers::write(hc, &spec, params).await
    }

    async fn delete(&self, hc: &HandlerContext<'_>, params: &DeleteParams) -> Result<DeleteResult> {
        let spec = self.object_spec(hc.module, &params.object_name)?;
        handlers::delete(hc, &spec, params).await
    }

    async fn batch_write(
        &self,
        _hc: &HandlerContext<'_>,
        params: &BatchWriteParams,
    ) -> Result<BatchWriteResult> {
        Err(Error::not_supported(Operation::BatchWrite, &params.object_name))
    }

    async fn record_count(
        &self,
        _hc: &HandlerContext<'_>,
        params: &RecordCountParams,
    ) -> Result<RecordCountResult> {
        Err(Error::not_supported(Operation::RecordCount, &params.object_name))
    }

    /// Where a single record sits in a by-id response (empty for the body)
    fn single_record_path(&self, _object: &str) -> &'static str {
        ""
    }

    /// Fetch one record by id
    async fn get_record(
        &self,
        hc: &HandlerContext<'_>,
        object: &str,
        record_id: &str,
    ) -> Result<ReadResultRow> {
        let spec = self.object_spec(hc.module, object)?;
        handlers::get_record(hc, &spec, record_id, self.single_record_path(object)).await
    }

    /// Fetch the record a webhook event refers to
    async fn get_record_from_event(
        &self,
        hc: &HandlerContext<'_>,
        event: &dyn SubscriptionEvent,
    ) -> Result<ReadResultRow> {
        let object = event.object_name()?;
        let record_id = event.record_id()?;
        self.get_record(hc, &object, &record_id).await
    }

    /// Describe one object: static schema first, then a sampled record
    async fn object_metadata(&self, hc: &HandlerContext<'_>, object: &str) -> Result<ObjectMetadata> {
        if provider_schemas(self.name().as_str())?.is_some() {
            match handlers::static_metadata(self.name().as_str(), hc.module, object) {
                Err(e) if e.is(ErrorKind::ObjectNotFound) => {}
                other => return other,
            }
        }
        let spec = self.object_spec(hc.module, object)?;
        handlers::sample_metadata(hc, &spec, object).await
    }

    /// Webhook support, if the provider has any
    fn webhooks(&self) -> Option<&dyn Webhooks> {
        None
    }

    /// Provider naming rules for objects and fields
    fn normalize_entity_name(&self, entity: Entity, input: &str) -> String {
        match entity {
            Entity::Object => snake_case(input),
            Entity::Field => input.to_string(),
        }
    }
}

/// Webhook lifecycle of a provider
#[async_trait]
pub trait Webhooks: Send + Sync {
    /// Uniform event types accepted per object
    fn allowed_events(&self, object: &str) -> &'static [SubscriptionEventType];

    async fn subscribe(
        &self,
        _hc: &HandlerContext<'_>,
        params: &SubscribeParams,
    ) -> Result<SubscriptionResult> {
        Err(Error::not_supported(Operation::Subscribe, first_object(params)))
    }

    /// Replace a subscription's events
    async fn update_subscription(
        &self,
        _hc: &HandlerContext<'_>,
        params: &SubscribeParams,
        _previous: &SubscriptionResult,
    ) -> Result<SubscriptionResult> {
        Err(Error::not_supported(Operation::Subscribe, first_object(params)))
    }

    /// Remove a subscription; `events` of the argument name what to remove
    async fn delete_subscription(
        &self,
        _hc: &HandlerContext<'_>,
        subscription: &SubscriptionResult,
    ) -> Result<()> {
        Err(Error::not_supported(Operation::Subscribe, subscription.id.clone()))
    }

    /// Check a delivery's signature
    fn verify_webhook_message(&self, _request: &WebhookRequest, _signing_key: &str) -> Result<bool> {
        Err(Error::not_supported(Operation::Subscribe, "webhook"))
    }

    /// Decode a delivery into normalized events
    fn parse_events(&self, body: &[u8]) -> Result<Vec<Box<dyn SubscriptionEvent>>>;
}

fn first_object(params: &SubscribeParams) -> String {
    params
        .subscription_events
        .keys()
        .next()
        .cloned()
        .unwrap_or_default()
}

/// Lowercase snake case: `ScheduledEvents` and `scheduled-events` become `scheduled_events`
pub fn snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for ch in input.trim().chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else if ch.is_alphanumeric() {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
