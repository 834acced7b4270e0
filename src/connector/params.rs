//! Connector construction parameters

use crate::http::HttpClient;
use crate::model::PostAuthInfo;
use crate::providers::ProviderName;
use crate::types::Metadata;

/// Metadata key under which the workspace is exposed to templates
pub const WORKSPACE_KEY: &str = "workspace";

/// Everything needed to build a [`Connector`](super::Connector)
#[derive(Clone)]
pub struct ConnectorParams {
    pub provider: ProviderName,
    /// Module id; the provider's default module when `None`
    pub module: Option<String>,
    /// Tenant identifier of the caller (HubSpot portal, Slack team, ...)
    pub workspace: Option<String>,
    /// Provider metadata (tenant ids, agency slugs) used by URL templates
    pub metadata: Metadata,
    /// Authenticated transport
    pub client: HttpClient,
    /// Replaces the catalog base URL; used by tests against mock servers
    pub base_url: Option<String>,
    /// Post-auth info known ahead of time; skips discovery
    pub post_auth: Option<PostAuthInfo>,
}

impl ConnectorParams {
    pub fn new(provider: ProviderName, client: HttpClient) -> Self {
        Self {
            provider,
            module: None,
            workspace: None,
            metadata: Metadata::new(),
            client,
            base_url: None,
            post_auth: None,
        }
    }

    #[must_use]
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    #[must_use]
    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    /// Add one metadata entry
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace all metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn post_auth_info(mut self, info: PostAuthInfo) -> Self {
        self.post_auth = Some(info);
        self
    }

    /// Metadata as seen by templates: the workspace is added unless set explicitly
    pub(crate) fn resolved_metadata(&self) -> Metadata {
        let mut metadata = self.metadata.clone();
        if let Some(workspace) = &self.workspace {
            metadata
                .entry(WORKSPACE_KEY.to_string())
                .or_insert_with(|| workspace.clone());
        }
        metadata
    }
}
