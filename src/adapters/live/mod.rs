//! Live adapters that call the real provider APIs.

pub mod modelslab;
pub mod stability;

use reqwest::StatusCode;

/// Longest provider body kept in an error message.
const MAX_ERROR_BODY: usize = 500;

/// Error text for a non-success provider response. Falls back to the status
/// reason when the body is blank.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let message = truncate_body(body);
    if !message.is_empty() {
        return message;
    }
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}

/// Truncate a provider body for use in an error message, respecting char
/// boundaries.
pub(crate) fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
