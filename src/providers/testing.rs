//! Test harness for adapters: a mock server standing in for the provider

use super::{join_module_url, provider_info, Provider, ProviderName};
use crate::auth::AuthConfig;
use crate::handlers::HandlerContext;
use crate::http::{HttpClient, HttpClientConfig, JsonHttpClient};
use crate::model::PostAuthInfo;
use crate::types::Metadata;
use crate::urlbuilder::Headers;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

pub(crate) struct Harness {
    pub server: MockServer,
    pub adapter: Arc<dyn Provider>,
    pub client: JsonHttpClient,
    pub ctx: CancellationToken,
    pub base_url: String,
    pub module_url: String,
    pub module: String,
    pub metadata: Metadata,
    pub post_auth: Option<PostAuthInfo>,
    pub headers: Headers,
}

impl Harness {
    /// Mock provider on the default module, authenticated with bearer `tok`
    pub async fn start(provider: ProviderName) -> Self {
        let server = MockServer::start().await;
        let adapter = provider.adapter();
        let info = provider_info(provider.as_str()).unwrap();
        let (module, module_info) = info.module(None).unwrap();

        let http = HttpClient::with_auth(HttpClientConfig::default(), AuthConfig::bearer("tok"))
            .unwrap();
        let client = JsonHttpClient::new(http, adapter.error_interpreter());
        let base_url = server.uri();
        let module_url = join_module_url(&base_url, &module_info.path);

        let mut harness = Self {
            server,
            adapter,
            client,
            ctx: CancellationToken::new(),
            base_url,
            module_url,
            module: module.to_string(),
            metadata: Metadata::new(),
            post_auth: None,
            headers: Headers::new(),
        };
        harness.refresh_headers();
        harness
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self.refresh_headers();
        self
    }

    pub fn with_post_auth<const N: usize>(mut self, pairs: [(&str, &str); N]) -> Self {
        self.post_auth = Some(PostAuthInfo::from_pairs(pairs));
        self.refresh_headers();
        self
    }

    fn refresh_headers(&mut self) {
        self.headers = self
            .adapter
            .common_headers(&self.module, &self.metadata, self.post_auth.as_ref())
            .unwrap();
    }

    pub fn hc(&self) -> HandlerContext<'_> {
        HandlerContext {
            ctx: &self.ctx,
            client: &self.client,
            base_url: &self.base_url,
            module_url: &self.module_url,
            module: &self.module,
            metadata: &self.metadata,
            post_auth: self.post_auth.as_ref(),
            headers: &self.headers,
        }
    }
}
