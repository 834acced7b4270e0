//! Per-call handler context

use crate::error::Result;
use crate::http::JsonHttpClient;
use crate::model::PostAuthInfo;
use crate::template::{render, TemplateContext};
use crate::types::Metadata;
use crate::urlbuilder::{Headers, UrlBuilder};
use tokio_util::sync::CancellationToken;

/// Everything a handler needs for one call
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub ctx: &'a CancellationToken,
    pub client: &'a JsonHttpClient,
    /// Provider base URL
    pub base_url: &'a str,
    /// Base URL joined with the module root
    pub module_url: &'a str,
    pub module: &'a str,
    pub metadata: &'a Metadata,
    pub post_auth: Option<&'a PostAuthInfo>,
    /// Provider headers sent with every call (revision, tenant id)
    pub headers: &'a Headers,
}

impl<'a> HandlerContext<'a> {
    pub fn template(&self) -> TemplateContext<'a> {
        TemplateContext::new(self.metadata).with_post_auth(self.post_auth)
    }

    /// Render a path template relative to the module root
    pub fn module_path(&self, path: &str) -> Result<UrlBuilder> {
        let rendered = render(path, &self.template())?;
        UrlBuilder::new(self.module_url, &[rendered.as_str()])
    }

    /// Render a path template relative to the provider base URL
    pub fn base_path(&self, path: &str) -> Result<UrlBuilder> {
        let rendered = render(path, &self.template())?;
        UrlBuilder::new(self.base_url, &[rendered.as_str()])
    }

    /// Metadata value, or `MissingMetadata`
    pub fn metadata_value(&self, key: &str) -> Result<&'a str> {
        self.template().get(&format!("metadata.{key}"))
    }

    /// Post-auth value, or `MissingPostAuthInfo`
    pub fn post_auth_value(&self, key: &str) -> Result<&'a str> {
        self.template().get(&format!("auth.{key}"))
    }
}
