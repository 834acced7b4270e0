//! Error interpretation
//!
//! Maps non-2xx responses (and envelope errors hidden in 2xx bodies) to the
//! uniform error taxonomy while keeping the provider's own message.

use super::json::JsonHttpResponse;
use crate::error::{ApiErrorKind, Error, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use std::time::Duration;

/// Provider error parsed out of a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Status reported inside the body, if any
    pub status: Option<u16>,
    /// Class forced by the provider format, overriding status mapping
    pub kind: Option<ApiErrorKind>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            kind: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ApiErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A provider error body shape: the keys that identify it and how to parse it
#[derive(Clone, Copy)]
pub struct ErrorFormat {
    pub name: &'static str,
    required_keys: &'static [&'static str],
    parse: fn(&Value) -> Option<ProviderError>,
}

impl ErrorFormat {
    pub const fn new(
        name: &'static str,
        required_keys: &'static [&'static str],
        parse: fn(&Value) -> Option<ProviderError>,
    ) -> Self {
        Self {
            name,
            required_keys,
            parse,
        }
    }

    fn matches(&self, body: &Value) -> bool {
        body.as_object()
            .is_some_and(|obj| self.required_keys.iter().all(|k| obj.contains_key(*k)))
    }
}

impl std::fmt::Debug for ErrorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorFormat")
            .field("name", &self.name)
            .field("required_keys", &self.required_keys)
            .finish_non_exhaustive()
    }
}

/// Ordered list of error formats; the first match whose parse succeeds wins
#[derive(Debug, Clone, Default)]
pub struct FormatSwitch {
    formats: Vec<ErrorFormat>,
}

impl FormatSwitch {
    pub fn new(formats: impl IntoIterator<Item = ErrorFormat>) -> Self {
        Self {
            formats: formats.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Parse a body with the first format whose keys are all present
    pub fn parse(&self, body: &Value) -> Option<ProviderError> {
        self.formats
            .iter()
            .filter(|format| format.matches(body))
            .find_map(|format| (format.parse)(body))
    }
}

/// Turns responses into uniform errors
pub trait ErrorInterpreter: Send + Sync {
    /// Interpret a non-2xx response
    fn interpret(&self, response: &JsonHttpResponse) -> Error;

    /// Inspect a 2xx response for an envelope error
    fn inspect_success(&self, _response: &JsonHttpResponse) -> Result<()> {
        Ok(())
    }
}

/// Status mapping plus provider format switches
#[derive(Debug, Clone, Default)]
pub struct DefaultInterpreter {
    errors: FormatSwitch,
    envelope: FormatSwitch,
}

impl DefaultInterpreter {
    pub fn new(errors: FormatSwitch) -> Self {
        Self {
            errors,
            envelope: FormatSwitch::default(),
        }
    }

    /// Formats checked on success statuses
    #[must_use]
    pub fn with_envelope(mut self, envelope: FormatSwitch) -> Self {
        self.envelope = envelope;
        self
    }
}

impl ErrorInterpreter for DefaultInterpreter {
    fn interpret(&self, response: &JsonHttpResponse) -> Error {
        let status = response.status;
        let parsed = response.body().and_then(|body| self.errors.parse(body));

        let kind = parsed
            .as_ref()
            .and_then(|p| p.kind)
            .or_else(|| ApiErrorKind::from_status(status))
            .unwrap_or(ApiErrorKind::RequestFailed);

        let message = match parsed {
            Some(p) => p.message,
            None => fallback_message(response),
        };

        Error::combine(kind, message)
            .with_status(status)
            .with_retry_after(retry_after(&response.headers))
    }

    fn inspect_success(&self, response: &JsonHttpResponse) -> Result<()> {
        if self.envelope.is_empty() {
            return Ok(());
        }
        let Some(parsed) = response.body().and_then(|body| self.envelope.parse(body)) else {
            return Ok(());
        };

        let kind = parsed
            .kind
            .or_else(|| parsed.status.and_then(ApiErrorKind::from_status))
            .unwrap_or(ApiErrorKind::BadRequest);

        let mut err = Error::combine(kind, parsed.message);
        if let Some(status) = parsed.status {
            err = err.with_status(status);
        }
        Err(err)
    }
}

fn fallback_message(response: &JsonHttpResponse) -> String {
    let text = String::from_utf8_lossy(response.raw());
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unexpected status")
        .to_string()
}

/// Parse a `Retry-After` header given in seconds
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
