//! Error body shapes shared by several providers

use super::interpreter::{ErrorFormat, ProviderError};
use serde_json::Value;

/// `{"message": "..."}`
pub const MESSAGE_FORMAT: ErrorFormat = ErrorFormat::new("message", &["message"], parse_message);

/// JSON:API style `{"errors": [{"title": "...", "detail": "..."}]}`
pub const ERRORS_ARRAY_FORMAT: ErrorFormat =
    ErrorFormat::new("errors-array", &["errors"], parse_errors_array);

/// `{"error": {"message": "...", "type": "..."}}`
pub const ERROR_OBJECT_FORMAT: ErrorFormat =
    ErrorFormat::new("error-object", &["error"], parse_error_object);

/// `{"error": "code", "error_description": "..."}`
pub const ERROR_STRING_FORMAT: ErrorFormat =
    ErrorFormat::new("error-string", &["error"], parse_error_string);

fn parse_message(body: &Value) -> Option<ProviderError> {
    let message = body.get("message")?.as_str()?;
    Some(ProviderError::new(message))
}

fn parse_errors_array(body: &Value) -> Option<ProviderError> {
    let errors = body.get("errors")?.as_array()?;
    let messages: Vec<String> = errors.iter().filter_map(describe_error_item).collect();
    if messages.is_empty() {
        return None;
    }

    let mut err = ProviderError::new(messages.join("; "));
    if let Some(status) = errors.first().and_then(item_status) {
        err = err.with_status(status);
    }
    Some(err)
}

fn describe_error_item(item: &Value) -> Option<String> {
    if let Some(s) = item.as_str() {
        return Some(s.to_string());
    }
    let title = item.get("title").and_then(Value::as_str);
    let detail = item
        .get("detail")
        .or_else(|| item.get("message"))
        .and_then(Value::as_str);
    match (title, detail) {
        (Some(t), Some(d)) => Some(format!("{t}: {d}")),
        (Some(t), None) => Some(t.to_string()),
        (None, Some(d)) => Some(d.to_string()),
        (None, None) => None,
    }
}

fn item_status(item: &Value) -> Option<u16> {
    match item.get("status")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_error_object(body: &Value) -> Option<ProviderError> {
    let error = body.get("error")?.as_object()?;
    let message = error.get("message").and_then(Value::as_str)?;
    let message = match error.get("type").and_then(Value::as_str) {
        Some(kind) => format!("{kind}: {message}"),
        None => message.to_string(),
    };
    Some(ProviderError::new(message))
}

fn parse_error_string(body: &Value) -> Option<ProviderError> {
    let code = body.get("error")?.as_str()?;
    let message = match body.get("error_description").and_then(Value::as_str) {
        Some(desc) => format!("{code}: {desc}"),
        None => code.to_string(),
    };
    Some(ProviderError::new(message))
}
