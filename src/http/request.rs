//! Outgoing request description

use crate::types::Method;
use crate::urlbuilder::{Headers, UrlBuilder};
use serde_json::Value;
use url::Url;

/// Request body with its content type
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/json`
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

/// A fully built request, produced by a handler and sent by the client
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Headers,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: &UrlBuilder) -> Self {
        Self {
            method,
            url: url.to_url(),
            headers: Headers::new(),
            body: RequestBody::Empty,
        }
    }

    /// Request to a URL taken as-is; repeated query keys and their order survive
    pub fn raw(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: &UrlBuilder) -> Self {
        Self::new(Method::GET, url)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }
}
