//! Connector runtime
//!
//! A [`Connector`] binds one provider adapter to an authenticated transport
//! and a module. Every operation goes through the same steps:
//!
//! 1. parameter validation (no I/O)
//! 2. endpoint-support check for the object
//! 3. post-auth discovery, once per connector
//! 4. dispatch to the adapter

mod params;
mod support;
mod validate;

pub use params::{ConnectorParams, WORKSPACE_KEY};
pub use support::{EndpointSupport, Support, SupportRule};

use crate::error::{Error, Result};
use crate::handlers::HandlerContext;
use crate::http::JsonHttpClient;
use crate::model::{
    BatchWriteParams, BatchWriteResult, DeleteParams, DeleteResult, Entity,
    ListObjectMetadataResult, Operation, PostAuthInfo, ReadParams, ReadResult, ReadResultRow,
    RecordCountParams, RecordCountResult, SubscribeParams, SubscriptionEvent, SubscriptionResult,
    WebhookRequest, WriteParams, WriteResult,
};
use crate::providers::{join_module_url, provider_info, Provider, ProviderName, Webhooks};
use crate::types::Metadata;
use crate::urlbuilder::Headers;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Uniform connector over one provider module
///
/// Read-only after construction apart from the post-auth cache, which is
/// written at most once; safe to share across tasks.
pub struct Connector {
    provider: ProviderName,
    adapter: Arc<dyn Provider>,
    client: JsonHttpClient,
    module: String,
    /// Module root relative to the base URL
    module_root: String,
    base_url: String,
    module_url: String,
    workspace: Option<String>,
    metadata: Metadata,
    support: EndpointSupport,
    post_auth: OnceCell<PostAuthInfo>,
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("provider", &self.provider)
            .field("module", &self.module)
            .field("module_url", &self.module_url)
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl Connector {
    /// Build a connector
    ///
    /// Fails on an unknown module or when the provider's required metadata
    /// is missing.
    pub fn new(params: ConnectorParams) -> Result<Self> {
        let info = provider_info(params.provider.as_str())?;
        let (module, module_info) = info.module(params.module.as_deref())?;
        let adapter = params.provider.adapter();

        let metadata = params.resolved_metadata();
        for key in adapter.required_metadata() {
            if metadata.get(*key).map_or(true, String::is_empty) {
                return Err(Error::MissingMetadata {
                    key: (*key).to_string(),
                });
            }
        }

        let base_url = params
            .base_url
            .clone()
            .unwrap_or_else(|| info.module_base_url(module_info).to_string());
        let module_url = join_module_url(&base_url, &module_info.path);
        let client = JsonHttpClient::new(params.client, adapter.error_interpreter());

        info!(provider = %params.provider, module, %module_url, "connector ready");

        Ok(Self {
            provider: params.provider,
            support: adapter.support(module),
            adapter,
            client,
            module: module.to_string(),
            module_root: module_info.path.clone(),
            base_url,
            module_url,
            workspace: params.workspace,
            metadata,
            post_auth: OnceCell::new_with(params.post_auth),
        })
    }

    pub fn provider(&self) -> ProviderName {
        self.provider
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point every module at another host (mock servers in tests)
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
        self.module_url = join_module_url(&self.base_url, &self.module_root);
    }

    /// Endpoint support of the active module
    pub fn support(&self) -> EndpointSupport {
        self.support
    }

    pub fn supports(&self, object: &str, op: Operation) -> bool {
        self.support.supports(object, op)
    }

    fn require(&self, object: &str, op: Operation) -> Result<()> {
        if self.support.supports(object, op) {
            Ok(())
        } else {
            Err(Error::not_supported(op, object))
        }
    }

    fn webhooks(&self) -> Result<&dyn Webhooks> {
        self.adapter
            .webhooks()
            .ok_or_else(|| Error::not_supported(Operation::Subscribe, self.provider.as_str()))
    }

    fn handler_context<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        post_auth: Option<&'a PostAuthInfo>,
        headers: &'a Headers,
    ) -> HandlerContext<'a> {
        HandlerContext {
            ctx,
            client: &self.client,
            base_url: &self.base_url,
            module_url: &self.module_url,
            module: &self.module,
            metadata: &self.metadata,
            post_auth,
            headers,
        }
    }

    async fn discover_post_auth(&self, ctx: &CancellationToken) -> Result<PostAuthInfo> {
        let headers = self
            .adapter
            .common_headers(&self.module, &self.metadata, None)?;
        let hc = self.handler_context(ctx, None, &headers);
        let info = self.adapter.post_auth_info(&hc).await?;
        debug!(provider = %self.provider, vars = info.catalog_vars.len(), "post-auth info discovered");
        Ok(info)
    }

    /// Post-auth info for an operation: discovered on first need, cached after
    async fn ensure_post_auth(&self, ctx: &CancellationToken) -> Result<Option<&PostAuthInfo>> {
        if let Some(info) = self.post_auth.get() {
            return Ok(Some(info));
        }
        if !self.adapter.requires_post_auth(&self.metadata) {
            return Ok(None);
        }
        let info = self
            .post_auth
            .get_or_try_init(|| self.discover_post_auth(ctx))
            .await?;
        Ok(Some(info))
    }

    async fn prepare(&self, ctx: &CancellationToken) -> Result<(Option<&PostAuthInfo>, Headers)> {
        let post_auth = self.ensure_post_auth(ctx).await?;
        let headers = self
            .adapter
            .common_headers(&self.module, &self.metadata, post_auth)?;
        Ok((post_auth, headers))
    }

    /// Catalog variables of the authenticated account
    pub async fn get_post_auth_info(&self, ctx: &CancellationToken) -> Result<PostAuthInfo> {
        let info = self
            .post_auth
            .get_or_try_init(|| self.discover_post_auth(ctx))
            .await?;
        Ok(info.clone())
    }

    /// Describe objects concurrently
    ///
    /// Per-object failures land in `errors`; the call itself fails only on
    /// empty input, post-auth failure or cancellation.
    pub async fn list_object_metadata(
        &self,
        ctx: &CancellationToken,
        object_names: &[&str],
    ) -> Result<ListObjectMetadataResult> {
        if object_names.is_empty() {
            return Err(Error::MissingObjects);
        }
        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        let hc = &hc;

        let mut tasks: FuturesUnordered<_> = object_names
            .iter()
            .map(|&name| async move {
                let outcome = match self.require(name, Operation::Metadata) {
                    Ok(()) => self.adapter.object_metadata(hc, name).await,
                    Err(e) => Err(e),
                };
                (name, outcome)
            })
            .collect();

        let mut out = ListObjectMetadataResult::default();
        loop {
            tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(Error::Cancelled),
                next = tasks.next() => match next {
                    Some((name, Ok(metadata))) => {
                        out.result.insert(name.to_string(), metadata);
                    }
                    Some((name, Err(e))) => {
                        debug!(provider = %self.provider, object = name, error = %e, "metadata failed");
                        out.errors.insert(name.to_string(), e);
                    }
                    None => break,
                },
            }
        }
        Ok(out)
    }

    /// Read one page of an object
    pub async fn read(&self, ctx: &CancellationToken, params: &ReadParams) -> Result<ReadResult> {
        validate::read(params, self.adapter.fields_optional())?;
        self.require(&params.object_name, Operation::Read)?;
        self.adapter.validate_read(&self.module, params)?;
        // adapters without a declarative spec check their own tokens
        if let Ok(spec) = self.adapter.object_spec(&self.module, &params.object_name) {
            validate::next_page(&spec.pagination, &params.next_page)?;
        }

        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        debug!(provider = %self.provider, object = %params.object_name, "read");
        self.adapter.read(&hc, params).await
    }

    /// Create a record, or update it when `record_id` is set
    pub async fn write(&self, ctx: &CancellationToken, params: &WriteParams) -> Result<WriteResult> {
        validate::write(params)?;
        self.require(&params.object_name, Operation::Write)?;

        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        debug!(
            provider = %self.provider,
            object = %params.object_name,
            update = params.is_update(),
            "write"
        );
        self.adapter.write(&hc, params).await
    }

    pub async fn batch_write(
        &self,
        ctx: &CancellationToken,
        params: &BatchWriteParams,
    ) -> Result<BatchWriteResult> {
        validate::batch_write(params)?;
        self.require(&params.object_name, Operation::BatchWrite)?;

        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        debug!(
            provider = %self.provider,
            object = %params.object_name,
            items = params.items.len(),
            "batch write"
        );
        self.adapter.batch_write(&hc, params).await
    }

    pub async fn delete(&self, ctx: &CancellationToken, params: &DeleteParams) -> Result<DeleteResult> {
        validate::delete(params)?;
        self.require(&params.object_name, Operation::Delete)?;

        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        debug!(provider = %self.provider, object = %params.object_name, "delete");
        self.adapter.delete(&hc, params).await
    }

    pub async fn get_record_count(
        &self,
        ctx: &CancellationToken,
        params: &RecordCountParams,
    ) -> Result<RecordCountResult> {
        validate::record_count(params)?;
        self.require(&params.object_name, Operation::RecordCount)?;

        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        self.adapter.record_count(&hc, params).await
    }

    fn check_subscription(&self, params: &SubscribeParams) -> Result<&dyn Webhooks> {
        let webhooks = self.webhooks()?;
        validate::subscribe(params, webhooks)?;
        for object in params.subscription_events.keys() {
            self.require(object, Operation::Subscribe)?;
        }
        Ok(webhooks)
    }

    /// Register a webhook subscription for the requested objects and events
    pub async fn subscribe(
        &self,
        ctx: &CancellationToken,
        params: &SubscribeParams,
    ) -> Result<SubscriptionResult> {
        let webhooks = self.check_subscription(params)?;
        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        let result = webhooks.subscribe(&hc, params).await?;
        info!(provider = %self.provider, id = %result.id, "subscribed");
        Ok(result)
    }

    /// Replace the events of an existing subscription
    pub async fn update_subscription(
        &self,
        ctx: &CancellationToken,
        params: &SubscribeParams,
        previous: &SubscriptionResult,
    ) -> Result<SubscriptionResult> {
        let webhooks = self.check_subscription(params)?;
        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        let result = webhooks.update_subscription(&hc, params, previous).await?;
        info!(provider = %self.provider, id = %result.id, "subscription updated");
        Ok(result)
    }

    /// Remove a subscription, or only the events it names where the provider allows
    pub async fn delete_subscription(
        &self,
        ctx: &CancellationToken,
        subscription: &SubscriptionResult,
    ) -> Result<()> {
        let webhooks = self.webhooks()?;
        if subscription.id.trim().is_empty() {
            return Err(Error::invalid_params("missing subscription id"));
        }
        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        webhooks.delete_subscription(&hc, subscription).await?;
        info!(provider = %self.provider, id = %subscription.id, "subscription deleted");
        Ok(())
    }

    /// Check the signature of a webhook delivery
    pub fn verify_webhook_message(&self, request: &WebhookRequest, signing_key: &str) -> Result<bool> {
        self.webhooks()?.verify_webhook_message(request, signing_key)
    }

    /// Decode a webhook delivery into normalized events
    pub fn parse_webhook_events(&self, body: &[u8]) -> Result<Vec<Box<dyn SubscriptionEvent>>> {
        self.webhooks()?.parse_events(body)
    }

    /// Fetch the full record an event refers to
    pub async fn get_record_from_subscription_event(
        &self,
        ctx: &CancellationToken,
        event: &dyn SubscriptionEvent,
    ) -> Result<ReadResultRow> {
        let object = event.object_name()?;
        self.require(&object, Operation::Read)?;

        let (post_auth, headers) = self.prepare(ctx).await?;
        let hc = self.handler_context(ctx, post_auth, &headers);
        self.adapter.get_record_from_event(&hc, event).await
    }

    /// Provider naming of an object or field
    pub fn normalize_entity_name(&self, entity: Entity, input: &str) -> Result<String> {
        if input.trim().is_empty() {
            return Err(Error::invalid_params("empty entity name"));
        }
        Ok(self.adapter.normalize_entity_name(entity, input))
    }
}

#[cfg(test)]
mod tests;
