use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::{status_phrase, ApiError, ErrorPayload};

pub const NETWORK_FAILURE_MESSAGE: &str = "A network or server error occurred. Please try again.";
pub const CORRECT_FIELDS_MESSAGE: &str = "Please correct the errors highlighted below.";
pub const LOGIN_NETWORK_MESSAGE: &str = "Network error. Unable to connect to the server.";

/// Keys that carry a whole-form message rather than a field error.
const BANNER_KEYS: [&str; 3] = ["non_field_errors", "error", "detail"];

/// Backend field names that differ from the form input they belong to.
const FIELD_ALIASES: [(&str, &str); 1] = [("custom_registry_image_name", "tag")];

fn form_field(key: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(backend, _)| *backend == key)
        .map_or(key, |&(_, form)| form)
}

/// Errors to show on a form: inline messages keyed by field plus a banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub banner: Option<String>,
}

impl FormErrors {
    pub fn banner(message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            banner: Some(message.into()),
        }
    }

    pub fn with_field(mut self, field: &str, message: impl Into<String>) -> Self {
        self.fields.entry(field.to_string()).or_default().push(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.banner.is_none()
    }

    /// First message for a field, as rendered under its input.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn from_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::Network(_) => Self::banner(NETWORK_FAILURE_MESSAGE),
            ApiError::Http { status, body } => match body {
                ErrorPayload::Json(Value::Object(obj)) => {
                    let mut out = Self::default();
                    for (key, value) in obj {
                        if BANNER_KEYS.contains(&key.as_str()) {
                            continue;
                        }
                        let messages = messages_of(value);
                        if !messages.is_empty() {
                            out.fields.entry(form_field(key).to_string()).or_default().extend(messages);
                        }
                    }
                    out.banner = BANNER_KEYS
                        .iter()
                        .filter_map(|k| obj.get(*k))
                        .map(|v| messages_of(v).join(" "))
                        .find(|s| !s.is_empty())
                        .or_else(|| (!out.fields.is_empty()).then(|| CORRECT_FIELDS_MESSAGE.to_string()))
                        .or_else(|| Some(status_phrase(status)));
                    out
                }
                _ => Self::banner(status_phrase(status)),
            },
            other => Self::banner(other.to_string()),
        }
    }

    /// Moves messages for fields the form does not render into the banner,
    /// prefixed with the field name.
    pub fn keep_fields(mut self, rendered: &[&str]) -> Self {
        let (kept, stray): (BTreeMap<_, _>, BTreeMap<_, _>) = std::mem::take(&mut self.fields)
            .into_iter()
            .partition(|(name, _)| rendered.contains(&name.as_str()));
        self.fields = kept;
        if stray.is_empty() {
            return self;
        }
        let stray_text = stray
            .iter()
            .map(|(name, messages)| format!("{}: {}", name, messages.join(" ")))
            .collect::<Vec<_>>()
            .join(" ");
        self.banner = Some(match self.banner.take() {
            Some(b) if b == CORRECT_FIELDS_MESSAGE && self.fields.is_empty() => stray_text,
            Some(b) => format!("{} {}", b, stray_text),
            None => stray_text,
        });
        self
    }
}

/// Banner for a rejected login. The login form has no per-field errors.
pub fn login_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Network(_) => LOGIN_NETWORK_MESSAGE.to_string(),
        ApiError::Http { status, body } => match body {
            ErrorPayload::Json(v) => {
                let pick = |k: &str| v.get(k).map(crate::utils::value_to_short_string).filter(|s| !s.is_empty());
                pick("error")
                    .or_else(|| pick("detail"))
                    .unwrap_or_else(|| v.to_string())
            }
            _ => format!("Login failed ({})", status.as_u16()),
        },
        other => other.to_string(),
    }
}

/// Field error values arrive as a list of strings, a bare string, or
/// (rarely) nested objects.
fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        other => vec![crate::utils::value_to_short_string(other)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn http(status: u16, body: &str) -> ApiError {
        ApiError::Http {
            status: StatusCode::from_u16(status).unwrap(),
            body: ErrorPayload::from_bytes(body.as_bytes()),
        }
    }

    #[test]
    fn login_failures() {
        assert_eq!(
            login_failure_message(&http(400, r#"{"error":"Invalid credentials","detail":"x"}"#)),
            "Invalid credentials"
        );
        assert_eq!(login_failure_message(&http(401, "<html>")), "Login failed (401)");
        assert_eq!(login_failure_message(&ApiError::Network("refused".into())), LOGIN_NETWORK_MESSAGE);
    }

    #[test]
    fn field_keyed_errors_go_inline() {
        let errs = FormErrors::from_api_error(&http(400, r#"{"n_gpus": ["must be at least 1"]}"#));
        assert_eq!(errs.field("n_gpus"), Some("must be at least 1"));
        assert_eq!(errs.field("image_id"), None);
        assert_eq!(errs.banner_text(), Some(CORRECT_FIELDS_MESSAGE));
    }

    #[test]
    fn whole_form_messages_go_to_the_banner() {
        let errs = FormErrors::from_api_error(&http(400, r#"{"non_field_errors": ["a", "b"], "error": "x"}"#));
        assert_eq!(errs.banner_text(), Some("a b"));
        assert!(errs.fields.is_empty());

        let errs = FormErrors::from_api_error(&http(400, r#"{"error": "No available servers"}"#));
        assert_eq!(errs.banner_text(), Some("No available servers"));

        let errs = FormErrors::from_api_error(&http(403, r#"{"detail": "Not allowed"}"#));
        assert_eq!(errs.banner_text(), Some("Not allowed"));
    }

    #[test]
    fn string_field_values_are_accepted() {
        let errs = FormErrors::from_api_error(&http(400, r#"{"password2": "Password fields didn't match."}"#));
        assert_eq!(errs.field("password2"), Some("Password fields didn't match."));
    }

    #[test]
    fn malformed_bodies_use_the_status_phrase() {
        assert_eq!(
            FormErrors::from_api_error(&http(500, "<h1>Server Error</h1>")).banner_text(),
            Some("HTTP 500 Internal Server Error")
        );
        assert_eq!(FormErrors::from_api_error(&http(400, "[1,2]")).banner_text(), Some("HTTP 400 Bad Request"));
        assert_eq!(FormErrors::from_api_error(&http(400, "{}")).banner_text(), Some("HTTP 400 Bad Request"));
    }

    #[test]
    fn registry_name_errors_belong_to_the_tag_input() {
        let errs = FormErrors::from_api_error(&http(
            400,
            r#"{"custom_registry_image_name": ["image with this custom registry image name already exists."]}"#,
        ));
        assert_eq!(errs.field("tag"), Some("image with this custom registry image name already exists."));
        assert_eq!(errs.field("custom_registry_image_name"), None);
    }

    #[test]
    fn unrendered_fields_surface_in_the_banner() {
        let errs = FormErrors::from_api_error(&http(400, r#"{"gpu_type": ["unknown gpu"]}"#)).keep_fields(&["n_gpus"]);
        assert!(errs.fields.is_empty());
        assert_eq!(errs.banner_text(), Some("gpu_type: unknown gpu"));

        let errs = FormErrors::from_api_error(&http(400, r#"{"n_gpus": ["too many"], "region": ["closed"]}"#))
            .keep_fields(&["n_gpus"]);
        assert_eq!(errs.field("n_gpus"), Some("too many"));
        assert_eq!(errs.banner_text(), Some("Please correct the errors highlighted below. region: closed"));

        let errs = FormErrors::from_api_error(&http(400, r#"{"detail": "Quota hit", "region": "closed"}"#))
            .keep_fields(&["n_gpus"]);
        assert_eq!(errs.banner_text(), Some("Quota hit region: closed"));

        let errs = FormErrors::banner("x").keep_fields(&[]);
        assert_eq!(errs, FormErrors::banner("x"));
    }

    #[test]
    fn network_failures_are_distinct() {
        let errs = FormErrors::from_api_error(&ApiError::Network("connection refused".into()));
        assert_eq!(errs.banner_text(), Some(NETWORK_FAILURE_MESSAGE));
        assert!(errs.fields.is_empty());
    }
}
