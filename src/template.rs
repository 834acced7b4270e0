//! Template interpolation for object paths and query values
//!
//! Handles `{{ variable }}` interpolation in adapter URL templates.
//! Namespaced lookups `{{ metadata.project_id }}` and
//! `{{ auth.organizationId }}` read connector metadata and post-auth values;
//! a bare `{{ name }}` checks post-auth info, then metadata.

use crate::error::{Error, Result};
use crate::model::PostAuthInfo;
use crate::types::Metadata;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\s*\}\}")
        .expect("template regex is valid")
});

/// Values available to a template
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    metadata: &'a Metadata,
    post_auth: Option<&'a PostAuthInfo>,
}

impl<'a> TemplateContext<'a> {
    pub fn new(metadata: &'a Metadata) -> Self {
        Self {
            metadata,
            post_auth: None,
        }
    }

    #[must_use]
    pub fn with_post_auth(mut self, info: Option<&'a PostAuthInfo>) -> Self {
        self.post_auth = info;
        self
    }

    /// Resolve a variable
    pub fn get(&self, path: &str) -> Result<&'a str> {
        match path.split_once('.') {
            Some(("metadata", key)) => self
                .metadata
                .get(key)
                .map(String::as_str)
                .ok_or_else(|| Error::MissingMetadata {
                    key: key.to_string(),
                }),
            Some(("auth", key)) => match self.post_auth {
                Some(info) => info.get(key),
                None => Err(Error::MissingPostAuthInfo {
                    key: key.to_string(),
                }),
            },
            Some(_) => Err(Error::undefined_var(path)),
            None => self
                .post_auth
                .and_then(|info| info.catalog_vars.get(path))
                .or_else(|| self.metadata.get(path))
                .map(String::as_str)
                .ok_or_else(|| Error::undefined_var(path)),
        }
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext<'_>) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut last = 0;

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let (Some(full), Some(var)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        result.push_str(&template[last..full.start()]);
        result.push_str(ctx.get(var.as_str())?);
        last = full.end();
    }
    result.push_str(&template[last..]);

    Ok(result)
}
