use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::utils::value_to_short_string;

/// Longest slice of a non-JSON error body surfaced to the user.
const MAX_TEXT_ERROR_LEN: usize = 200;

/// Body of a non-2xx response, parsed as far as it allows.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorPayload {
    Json(Value),
    Text(String),
    Empty,
}

impl ErrorPayload {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(v) => Self::Json(v),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }

    /// `detail` or `error` from a JSON object body.
    pub fn message(&self) -> Option<String> {
        let obj = match self {
            Self::Json(Value::Object(obj)) => obj,
            _ => return None,
        };
        ["detail", "error"]
            .iter()
            .filter_map(|key| obj.get(*key))
            .map(value_to_short_string)
            .find(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was obtained.
    #[error("Network error: {0}")]
    Network(String),
    #[error("{}", status_phrase(.status))]
    Http { status: StatusCode, body: ErrorPayload },
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Message for a failed collection fetch: the backend's `detail`/`error`,
    /// then any other JSON content, then a truncated text body, then the
    /// status phrase.
    pub fn page_message(&self) -> String {
        match self {
            Self::Http { status, body } => match body {
                ErrorPayload::Json(v) => body.message().unwrap_or_else(|| {
                    let s = value_to_short_string(v);
                    if s.trim().is_empty() {
                        status_phrase(status)
                    } else {
                        s
                    }
                }),
                ErrorPayload::Text(t) => t.chars().take(MAX_TEXT_ERROR_LEN).collect(),
                ErrorPayload::Empty => status_phrase(status),
            },
            other => other.to_string(),
        }
    }

    /// Message for a failed row action (`detail`/`error`, else status phrase).
    pub fn action_message(&self, action: &str, instance_id: &str) -> String {
        match self {
            Self::Network(_) => format!("Network error trying to {} instance {}.", action, instance_id),
            Self::Http { status, body } => body
                .message()
                .unwrap_or_else(|| format!("Action failed: {}", status_phrase(status))),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// Deterministic "HTTP 503 Service Unavailable" style phrase.
pub fn status_phrase(status: &StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, body: &str) -> ApiError {
        ApiError::Http {
            status: StatusCode::from_u16(status).unwrap(),
            body: ErrorPayload::from_bytes(body.as_bytes()),
        }
    }

    #[test]
    fn detail_wins_over_error() {
        assert_eq!(http(403, r#"{"detail":"Forbidden here","error":"x"}"#).page_message(), "Forbidden here");
        assert_eq!(http(500, r#"{"error":"boom"}"#).page_message(), "boom");
    }

    #[test]
    fn unstructured_bodies_fall_back() {
        assert_eq!(http(502, "").page_message(), "HTTP 502 Bad Gateway");
        assert_eq!(http(500, "<html>oops</html>").page_message(), "<html>oops</html>");
        let long = "x".repeat(500);
        assert_eq!(http(500, &long).page_message().len(), MAX_TEXT_ERROR_LEN);
    }

    #[test]
    fn action_messages() {
        assert_eq!(http(409, r#"{"detail":"busy"}"#).action_message("start", "abc"), "busy");
        assert_eq!(http(404, "").action_message("start", "abc"), "Action failed: HTTP 404 Not Found");
        assert_eq!(
            ApiError::Network("refused".into()).action_message("stop", "abc"),
            "Network error trying to stop instance abc."
        );
    }
}
