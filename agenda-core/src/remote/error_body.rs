//! Mapping of non-success responses to [`AgendaError`].
//!
//! Laravel reports field errors as `{"errors": {"email": ["..."]}}`, Spring as
//! `{"errors": [{"field": "email", "defaultMessage": "..."}]}`. Both collapse
//! into [`AgendaError::ServerValidation`].

use serde_json::Value;

use crate::error::AgendaError;

const UNPROCESSABLE: u16 = 422;
const UNAUTHORIZED: u16 = 401;

/// Build the error for a failed response.
pub fn error_for_status(status: u16, body: &Value) -> AgendaError {
    if status == UNAUTHORIZED {
        return AgendaError::Unauthorized;
    }

    let messages = field_messages(body);
    if !messages.is_empty() {
        return AgendaError::ServerValidation(messages);
    }

    let message = summary(body);
    if status == UNPROCESSABLE {
        if let Some(message) = message {
            return AgendaError::ServerValidation(vec![message]);
        }
    }

    AgendaError::Http {
        status,
        message: message.unwrap_or_else(|| "request failed".to_string()),
    }
}

/// Individual messages from an object- or array-shaped `errors` field.
pub fn field_messages(body: &Value) -> Vec<String> {
    let mut messages = Vec::new();

    match body.get("errors") {
        Some(Value::Object(fields)) => {
            for value in fields.values() {
                collect(value, &mut messages);
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                collect(item, &mut messages);
            }
        }
        _ => {}
    }

    messages
}

fn collect(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        Value::Object(_) => {
            let text = ["message", "defaultMessage"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str));
            if let Some(text) = text {
                out.push(text.to_string());
            }
        }
        _ => {}
    }
}

/// Top-level `message` or `error` text, or a bare string body.
fn summary(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => ["message", "error"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
    }
}
