//! Error types for Solidafy Connectors
//!
//! This module defines the uniform error taxonomy shared by every provider.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into five groups:
//! - contract errors, raised before any network I/O
//! - transport errors, produced by the error interpreter from HTTP responses
//! - parse errors, produced by the JSON query layer
//! - domain errors (search caps, batch bookkeeping, webhooks)
//! - next-page errors
//!
//! Use [`Error::kind`] for identity checks that work across providers.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Uniform class of a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    AccessToken,
    Forbidden,
    NotFound,
    LimitExceeded,
    ApiDisabled,
    Server,
    RequestFailed,
    Retryable,
}

impl ApiErrorKind {
    /// Map an HTTP status code to its uniform class.
    ///
    /// Returns `None` for success statuses.
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            200..=399 => return None,
            400 | 409 => Self::BadRequest,
            401 => Self::AccessToken,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 | 502 | 504 => Self::LimitExceeded,
            503 => Self::ApiDisabled,
            500..=599 => Self::Server,
            _ => Self::RequestFailed,
        };
        Some(kind)
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadRequest => "bad request",
            Self::AccessToken => "invalid or expired access token",
            Self::Forbidden => "forbidden",
            Self::NotFound => "object not found",
            Self::LimitExceeded => "limit exceeded",
            Self::ApiDisabled => "API disabled",
            Self::Server => "server error",
            Self::RequestFailed => "request failed",
            Self::Retryable => "retryable error",
        };
        f.write_str(s)
    }
}

/// The main error type for Solidafy Connectors
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Contract Errors
    // ============================================================================
    #[error("missing object name")]
    MissingObjects,

    #[error("missing fields")]
    MissingFields,

    #[error("missing record id")]
    MissingRecordId,

    #[error("missing record data")]
    MissingRecordData,

    #[error("unknown write type: {write_type}")]
    UnknownWriteType { write_type: String },

    #[error("operation '{operation}' is not supported for object '{object}'")]
    OperationNotSupported { operation: String, object: String },

    #[error("object not found: {object}")]
    ObjectNotFound { object: String },

    #[error("missing required metadata: {key}")]
    MissingMetadata { key: String },

    #[error("missing post-authentication value: {key}")]
    MissingPostAuthInfo { key: String },

    #[error("unknown provider: {name}")]
    UnknownProvider { name: String },

    #[error("unknown module '{module}' for provider '{provider}'")]
    UnknownModule { provider: String, module: String },

    #[error("invalid parameters: {message}")]
    InvalidParams { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("{kind}: {message}")]
    Api {
        kind: ApiErrorKind,
        status: Option<u16>,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("operation cancelled")]
    Cancelled,

    // ============================================================================
    // Parse Errors
    // ============================================================================
    #[error("key not found: '{key}'")]
    KeyNotFound { key: String },

    #[error("value of '{key}' is null")]
    NullJson { key: String },

    #[error("value of '{key}' is not an array")]
    NotArray { key: String },

    #[error("value of '{key}' is not an object")]
    NotObject { key: String },

    #[error("value of '{key}' is not a string")]
    NotString { key: String },

    #[error("value of '{key}' is not a boolean")]
    NotBool { key: String },

    #[error("value of '{key}' is not numeric")]
    NotNumeric { key: String },

    #[error("value of '{key}' is not an integer")]
    NotInteger { key: String },

    #[error("failed to unmarshal response body: {0}")]
    FailedToUnmarshalBody(#[from] serde_json::Error),

    #[error("empty JSON HTTP response")]
    EmptyJsonHttpResponse,

    #[error("missing expected values: {message}")]
    MissingExpectedValues { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Domain Errors
    // ============================================================================
    #[error("results limit exceeded: search is capped at {limit} records")]
    ResultsLimitExceeded { limit: u64 },

    #[error("batch record was not processed")]
    BatchUnprocessedRecord,

    #[error("invalid event type: {event}")]
    InvalidEventType { event: String },

    #[error("invalid webhook signature: {message}")]
    InvalidSignature { message: String },

    #[error("missing webhook signature header: {header}")]
    MissingSignature { header: String },

    // ============================================================================
    // Next-Page Errors
    // ============================================================================
    #[error("invalid next page token '{token}'")]
    NextPageInvalid { token: String },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Flat identity of an [`Error`], stable across providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingObjects,
    MissingFields,
    MissingRecordId,
    MissingRecordData,
    UnknownWriteType,
    OperationNotSupported,
    ObjectNotFound,
    MissingMetadata,
    MissingPostAuthInfo,
    UnknownProvider,
    UnknownModule,
    InvalidParams,
    BadRequest,
    AccessToken,
    Forbidden,
    LimitExceeded,
    ApiDisabled,
    Server,
    RequestFailed,
    Retryable,
    Cancelled,
    KeyNotFound,
    NullJson,
    NotArray,
    NotObject,
    NotString,
    NotBool,
    NotNumeric,
    NotInteger,
    FailedToUnmarshalBody,
    EmptyJsonHttpResponse,
    MissingExpectedValues,
    ResultsLimitExceeded,
    BatchUnprocessedRecord,
    InvalidEventType,
    InvalidSignature,
    MissingSignature,
    NextPageInvalid,
    Other,
}

impl From<ApiErrorKind> for ErrorKind {
    fn from(kind: ApiErrorKind) -> Self {
        match kind {
            ApiErrorKind::BadRequest => Self::BadRequest,
            ApiErrorKind::AccessToken => Self::AccessToken,
            ApiErrorKind::Forbidden => Self::Forbidden,
            // 404 responses surface as the same class as an unknown object
            ApiErrorKind::NotFound => Self::ObjectNotFound,
            ApiErrorKind::LimitExceeded => Self::LimitExceeded,
            ApiErrorKind::ApiDisabled => Self::ApiDisabled,
            ApiErrorKind::Server => Self::Server,
            ApiErrorKind::RequestFailed => Self::RequestFailed,
            ApiErrorKind::Retryable => Self::Retryable,
        }
    }
}

impl Error {
    /// Combine a uniform class with a provider message (CombineErr).
    pub fn combine(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self::Api {
            kind,
            status: None,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a transport error from an HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            kind: ApiErrorKind::from_status(status).unwrap_or(ApiErrorKind::RequestFailed),
            status: Some(status),
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create an operation-not-supported error
    pub fn not_supported(operation: impl fmt::Display, object: impl Into<String>) -> Self {
        Self::OperationNotSupported {
            operation: operation.to_string(),
            object: object.into(),
        }
    }

    /// Create an object-not-found error
    pub fn object_not_found(object: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            object: object.into(),
        }
    }

    /// Create an invalid-params error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a missing-expected-values error
    pub fn missing_values(message: impl Into<String>) -> Self {
        Self::MissingExpectedValues {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a next-page error
    pub fn next_page_invalid(token: impl Into<String>) -> Self {
        Self::NextPageInvalid {
            token: token.into(),
        }
    }

    /// Attach a `Retry-After` hint to a transport error.
    #[must_use]
    pub fn with_retry_after(self, hint: Option<Duration>) -> Self {
        match self {
            Self::Api {
                kind,
                status,
                message,
                retry_after,
            } => Self::Api {
                kind,
                status,
                message,
                retry_after: hint.or(retry_after),
            },
            other => other,
        }
    }

    /// Attach the HTTP status to a transport error.
    #[must_use]
    pub fn with_status(self, code: u16) -> Self {
        match self {
            Self::Api {
                kind,
                message,
                retry_after,
                ..
            } => Self::Api {
                kind,
                status: Some(code),
                message,
                retry_after,
            },
            other => other,
        }
    }

    /// The uniform class of a transport error, if this is one.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Flat identity used for cross-provider checks.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingObjects => ErrorKind::MissingObjects,
            Self::MissingFields => ErrorKind::MissingFields,
            Self::MissingRecordId => ErrorKind::MissingRecordId,
            Self::MissingRecordData => ErrorKind::MissingRecordData,
            Self::UnknownWriteType { .. } => ErrorKind::UnknownWriteType,
            Self::OperationNotSupported { .. } => ErrorKind::OperationNotSupported,
            Self::ObjectNotFound { .. } => ErrorKind::ObjectNotFound,
            Self::MissingMetadata { .. } => ErrorKind::MissingMetadata,
            Self::MissingPostAuthInfo { .. } => ErrorKind::MissingPostAuthInfo,
            Self::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            Self::UnknownModule { .. } => ErrorKind::UnknownModule,
            Self::InvalidParams { .. } => ErrorKind::InvalidParams,
            Self::Api { kind, .. } => (*kind).into(),
            Self::Http(_) | Self::InvalidUrl(_) => ErrorKind::RequestFailed,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Self::NullJson { .. } => ErrorKind::NullJson,
            Self::NotArray { .. } => ErrorKind::NotArray,
            Self::NotObject { .. } => ErrorKind::NotObject,
            Self::NotString { .. } => ErrorKind::NotString,
            Self::NotBool { .. } => ErrorKind::NotBool,
            Self::NotNumeric { .. } => ErrorKind::NotNumeric,
            Self::NotInteger { .. } => ErrorKind::NotInteger,
            Self::FailedToUnmarshalBody(_) | Self::YamlParse(_) => {
                ErrorKind::FailedToUnmarshalBody
            }
            Self::EmptyJsonHttpResponse => ErrorKind::EmptyJsonHttpResponse,
            Self::MissingExpectedValues { .. } => ErrorKind::MissingExpectedValues,
            Self::ResultsLimitExceeded { .. } => ErrorKind::ResultsLimitExceeded,
            Self::BatchUnprocessedRecord => ErrorKind::BatchUnprocessedRecord,
            Self::InvalidEventType { .. } => ErrorKind::InvalidEventType,
            Self::InvalidSignature { .. } => ErrorKind::InvalidSignature,
            Self::MissingSignature { .. } => ErrorKind::MissingSignature,
            Self::NextPageInvalid { .. } => ErrorKind::NextPageInvalid,
            Self::UndefinedVariable { .. } | Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Identity check, the equivalent of `errors.Is` against a uniform class.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Api { kind, .. } => matches!(
                kind,
                ApiErrorKind::LimitExceeded
                    | ApiErrorKind::Server
                    | ApiErrorKind::Retryable
                    | ApiErrorKind::NotFound
            ),
            _ => false,
        }
    }
}

/// Result type alias for Solidafy Connectors
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(400, ApiErrorKind::BadRequest)]
    #[test_case(401, ApiErrorKind::AccessToken)]
    #[test_case(403, ApiErrorKind::Forbidden)]
    #[test_case(404, ApiErrorKind::NotFound)]
    #[test_case(409, ApiErrorKind::BadRequest)]
    #[test_case(429, ApiErrorKind::LimitExceeded)]
    #[test_case(500, ApiErrorKind::Server)]
    #[test_case(502, ApiErrorKind::LimitExceeded)]
    #[test_case(503, ApiErrorKind::ApiDisabled)]
    #[test_case(504, ApiErrorKind::LimitExceeded)]
    #[test_case(418, ApiErrorKind::RequestFailed)]
    fn test_status_mapping(status: u16, expected: ApiErrorKind) {
        assert_eq!(ApiErrorKind::from_status(status), Some(expected));
    }

    #[test]
    fn test_success_status_has_no_kind() {
        assert_eq!(ApiErrorKind::from_status(200), None);
        assert_eq!(ApiErrorKind::from_status(204), None);
    }

    #[test]
    fn test_combine_keeps_class_and_message() {
        let err = Error::combine(
            ApiErrorKind::BadRequest,
            "Tag Service Error: Tag with name 'popular' already exists",
        );
        assert!(err.is(ErrorKind::BadRequest));
        assert_eq!(
            err.to_string(),
            "bad request: Tag Service Error: Tag with name 'popular' already exists"
        );
    }

    #[test]
    fn test_not_found_maps_to_object_not_found() {
        let err = Error::from_status(404, "gone");
        assert!(err.is(ErrorKind::ObjectNotFound));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::from_status(429, "").is_retryable());
        assert!(Error::from_status(500, "").is_retryable());
        assert!(!Error::from_status(400, "").is_retryable());
        assert!(!Error::from_status(401, "").is_retryable());
        assert!(!Error::MissingObjects.is_retryable());
    }

    #[test]
    fn test_retry_after_is_attached() {
        let err = Error::from_status(429, "slow down")
            .with_retry_after(Some(Duration::from_secs(7)));
        match err {
            Error::Api { retry_after, .. } => assert_eq!(retry_after, Some(Duration::from_secs(7))),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::MissingFields);
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: missing fields"));
    }
}
