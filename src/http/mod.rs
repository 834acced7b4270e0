//! HTTP client module
//!
//! Authenticated JSON transport with uniform error semantics.
//!
//! # Features
//!
//! - **Transport**: `HttpClient` wraps a caller-supplied `reqwest::Client`
//!   and applies authentication and default headers
//! - **JSON**: `JsonHttpClient` sends JSON or form bodies and parses JSON responses
//! - **Errors**: non-2xx responses (and provider envelope errors on 2xx) are
//!   mapped to the uniform taxonomy by a pluggable `ErrorInterpreter`
//! - **Cancellation**: every send races a `CancellationToken`

mod client;
mod formats;
mod interpreter;
mod json;
mod request;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use formats::{ERRORS_ARRAY_FORMAT, ERROR_OBJECT_FORMAT, ERROR_STRING_FORMAT, MESSAGE_FORMAT};
pub use interpreter::{
    retry_after, DefaultInterpreter, ErrorFormat, ErrorInterpreter, FormatSwitch, ProviderError,
};
pub use json::{JsonHttpClient, JsonHttpResponse};
pub use request::{HttpRequest, RequestBody};
