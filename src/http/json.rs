//! JSON client

use super::client::HttpClient;
use super::interpreter::ErrorInterpreter;
use super::request::{HttpRequest, RequestBody};
use crate::error::{Error, Result};
use crate::jsonquery::parse_body;
use crate::types::Method;
use crate::urlbuilder::{encode_form, Headers};
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// A response with its parsed JSON body
#[derive(Debug, Clone)]
pub struct JsonHttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    body: Option<Value>,
    raw: Bytes,
}

impl JsonHttpResponse {
    /// Build a response from its parts (used by tests and adapters)
    pub fn new(status: u16, headers: HeaderMap, body: Option<Value>, raw: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            raw,
        }
    }

    /// Build a response from a JSON value
    pub fn from_json(status: u16, body: Value) -> Self {
        let raw = Bytes::from(body.to_string());
        Self::new(status, HeaderMap::new(), Some(body), raw)
    }

    /// Parsed body; `None` when the response body was empty
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Parsed body, or `EmptyJsonHttpResponse`
    pub fn require_body(&self) -> Result<&Value> {
        self.body.as_ref().ok_or(Error::EmptyJsonHttpResponse)
    }

    /// Raw response bytes
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON transport with a provider error interpreter
#[derive(Clone)]
pub struct JsonHttpClient {
    http: HttpClient,
    interpreter: Arc<dyn ErrorInterpreter>,
}

impl JsonHttpClient {
    pub fn new(http: HttpClient, interpreter: Arc<dyn ErrorInterpreter>) -> Self {
        Self { http, interpreter }
    }

    /// The underlying transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Map a failed response through the provider interpreter
    pub fn interpret(&self, response: &JsonHttpResponse) -> Error {
        self.interpreter.interpret(response)
    }

    /// Send a request; non-2xx statuses and envelope errors become `Error`s
    pub async fn send(&self, ctx: &CancellationToken, request: HttpRequest) -> Result<JsonHttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.send_unchecked(ctx, request).await?;

        if !response.is_success() {
            let err = self.interpreter.interpret(&response);
            warn!(%method, %url, status = response.status, error = %err, "request failed");
            return Err(err);
        }

        self.interpreter.inspect_success(&response).inspect_err(|err| {
            warn!(%method, %url, status = response.status, error = %err, "envelope error");
        })?;

        Ok(response)
    }

    /// Send a request and return the response whatever its status
    pub async fn send_unchecked(
        &self,
        ctx: &CancellationToken,
        request: HttpRequest,
    ) -> Result<JsonHttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut req = self.http.request(method.into(), url.clone());
        req = req.header(ACCEPT, "application/json");
        req = match body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(&value),
            RequestBody::Form(pairs) => req
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_form(&pairs)),
        };

        let mut header_map = HeaderMap::new();
        headers.apply(&mut header_map)?;
        req = req.headers(header_map);

        debug!(%method, %url, "sending request");

        let response = tokio::select! {
            biased;
            () = ctx.cancelled() => return Err(Error::Cancelled),
            response = req.send() => response?,
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let raw = tokio::select! {
            biased;
            () = ctx.cancelled() => return Err(Error::Cancelled),
            bytes = response.bytes() => bytes?,
        };

        let body = if (200..300).contains(&status) {
            parse_body(&raw)?
        } else {
            // error bodies are not always JSON
            parse_body(&raw).ok().flatten()
        };

        debug!(%method, %url, status, bytes = raw.len(), "received response");

        Ok(JsonHttpResponse::new(status, headers, body, raw))
    }

    /// GET a URL
    pub async fn get(&self, ctx: &CancellationToken, url: &Url, headers: &Headers) -> Result<JsonHttpResponse> {
        self.send(ctx, build(Method::GET, url, None, headers)).await
    }

    /// POST a JSON body
    pub async fn post(
        &self,
        ctx: &CancellationToken,
        url: &Url,
        body: Option<Value>,
        headers: &Headers,
    ) -> Result<JsonHttpResponse> {
        self.send(ctx, build(Method::POST, url, body, headers)).await
    }

    /// PUT a JSON body
    pub async fn put(
        &self,
        ctx: &CancellationToken,
        url: &Url,
        body: Option<Value>,
        headers: &Headers,
    ) -> Result<JsonHttpResponse> {
        self.send(ctx, build(Method::PUT, url, body, headers)).await
    }

    /// PATCH a JSON body
    pub async fn patch(
        &self,
        ctx: &CancellationToken,
        url: &Url,
        body: Option<Value>,
        headers: &Headers,
    ) -> Result<JsonHttpResponse> {
        self.send(ctx, build(Method::PATCH, url, body, headers)).await
    }

    /// DELETE a URL
    pub async fn delete(&self, ctx: &CancellationToken, url: &Url, headers: &Headers) -> Result<JsonHttpResponse> {
        self.send(ctx, build(Method::DELETE, url, None, headers)).await
    }
}

fn build(method: Method, url: &Url, body: Option<Value>, headers: &Headers) -> HttpRequest {
    HttpRequest {
        method,
        url: url.clone(),
        headers: headers.clone(),
        body: body.map_or(RequestBody::Empty, RequestBody::Json),
    }
}

impl std::fmt::Debug for JsonHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonHttpClient")
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}
