use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use yansi::Paint;

use super::error::{ApiError, ErrorPayload};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

static SILENT: AtomicBool = AtomicBool::new(false);

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// A 2xx response. `body` is `None` for 204, empty or non-JSON bodies.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

/// HTTP client bound to one backend and one cookie jar (one backend session).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    origin: Url,
    jar: Arc<Jar>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let origin = Url::parse(&base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .user_agent(format!("synapse/{}", env!("CARGO_PKG_VERSION")))
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            origin,
            jar,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookies the backend has set, as a `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.origin)
            .and_then(|h| h.to_str().ok().map(str::to_string))
    }

    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';') {
            let pair = pair.trim();
            if !pair.is_empty() {
                self.jar.add_cookie_str(pair, &self.origin);
            }
        }
    }

    pub fn csrf_token(&self) -> Option<String> {
        find_cookie(&self.cookie_header()?, CSRF_COOKIE)
    }

    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.api_call(Method::GET, endpoint, None).await
    }

    pub async fn post(&self, endpoint: &str, body: Option<&Value>) -> Result<ApiResponse, ApiError> {
        self.api_call(Method::POST, endpoint, body).await
    }

    pub async fn patch(&self, endpoint: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        self.api_call(Method::PATCH, endpoint, Some(body)).await
    }

    /// Core request path. Mutating requests echo the CSRF cookie in
    /// `X-CSRFToken`; non-2xx statuses become `ApiError::Http`.
    pub async fn api_call(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mutating = method != Method::GET && method != Method::HEAD;
        let csrf = if mutating { self.csrf_token() } else { None };

        log_curl(&method, &url, csrf.is_some(), body);
        tracing::debug!(%method, endpoint, "API request");

        let mut req = self.http.request(method.clone(), &url);
        if let Some(token) = &csrf {
            req = req.header(CSRF_HEADER, token);
        }
        if mutating {
            req = req.header(reqwest::header::REFERER, format!("{}/", self.base_url));
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, endpoint, error = %e, "API request failed before a response");
            ApiError::from(e)
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let preview = String::from_utf8_lossy(&bytes).to_string();
        log_output(format!(
            "Response {}:\n{}",
            status.as_u16(),
            Paint::new(preview).rgb(100, 100, 100)
        ));
        tracing::debug!(%method, endpoint, status = status.as_u16(), "API response");

        if status.is_success() {
            Ok(ApiResponse {
                status,
                body: parse_success_body(status, &bytes),
            })
        } else {
            Err(ApiError::Http {
                status,
                body: ErrorPayload::from_bytes(&bytes),
            })
        }
    }
}

fn parse_success_body(status: StatusCode, bytes: &[u8]) -> Option<Value> {
    if status == StatusCode::NO_CONTENT || bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, "2xx response body is not JSON; treating it as empty");
            None
        }
    }
}

/// Value of a named cookie in a `Cookie` header, percent-decoded.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| cookie::Cookie::parse(pair.trim()).ok())
        .find(|c| c.name() == name)
        .map(|c| {
            urlencoding::decode(c.value())
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| c.value().to_string())
        })
}

fn log_curl(method: &Method, url: &str, with_csrf: bool, body: Option<&Value>) {
    if SILENT.load(Ordering::Relaxed) {
        return;
    }
    let mut parts = Vec::new();
    parts.push(Paint::new("curl").fg(yansi::Color::Green).bold().to_string());
    parts.push(format!("-X {}", Paint::new(method.as_str()).fg(yansi::Color::Yellow).bold()));
    parts.push(format!("'{}'", Paint::new(url).fg(yansi::Color::Cyan)));
    if with_csrf {
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new(format!("'{}: ***'", CSRF_HEADER)).fg(yansi::Color::Magenta)
        ));
    }
    if let Some(d) = body {
        let json_str = serde_json::to_string_pretty(d).unwrap_or_default();
        let escaped_json = json_str.replace('\'', "'\\''");
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new("'Content-Type: application/json'").fg(yansi::Color::Magenta)
        ));
        parts.push(format!(
            "{} {}",
            Paint::new("-d").fg(yansi::Color::Blue),
            Paint::new(format!("'{}'", escaped_json)).fg(yansi::Color::White)
        ));
    }
    log_output(format!("Request:\n{}", parts.join(" ")));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csrf_cookie_is_found_and_decoded() {
        let header = "sessionid=abc; csrftoken=tok%2Fen; theme=dark";
        assert_eq!(find_cookie(header, "csrftoken").as_deref(), Some("tok/en"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn restored_cookies_feed_the_csrf_header() {
        let client = ApiClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.csrf_token(), None);
        client.restore_cookies("sessionid=s1; csrftoken=t1");
        assert_eq!(client.csrf_token().as_deref(), Some("t1"));
        let header = client.cookie_header().unwrap();
        assert!(header.contains("sessionid=s1"));
    }

    #[test]
    fn empty_and_non_json_success_bodies_are_none() {
        assert_eq!(parse_success_body(StatusCode::NO_CONTENT, b"[1]"), None);
        assert_eq!(parse_success_body(StatusCode::OK, b"  "), None);
        assert_eq!(parse_success_body(StatusCode::OK, b"<html>"), None);
        assert_eq!(parse_success_body(StatusCode::OK, b"[]"), Some(Value::Array(vec![])));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::InvalidBaseUrl(_))));
    }
}
