use serde_json::{json, Value};

use crate::models::{ProfileUpdate, SessionUser, SignupRequest};

use super::client::ApiClient;
use super::error::ApiError;

pub const LOGIN_ENDPOINT: &str = "/api/login/";
pub const LOGOUT_ENDPOINT: &str = "/api/logout/";
pub const SIGNUP_ENDPOINT: &str = "/api/signup/";
pub const PROFILE_ENDPOINT: &str = "/api/profile/";

/// Identifiers containing `@` are sent as `email`, anything else as `username`.
pub fn login_body(identifier: &str, password: &str) -> Value {
    let identifier = identifier.trim();
    if identifier.contains('@') {
        json!({ "email": identifier, "password": password })
    } else {
        json!({ "username": identifier, "password": password })
    }
}

pub async fn login(api: &ApiClient, identifier: &str, password: &str) -> Result<(), ApiError> {
    api.post(LOGIN_ENDPOINT, Some(&login_body(identifier, password))).await?;
    Ok(())
}

pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    api.post(LOGOUT_ENDPOINT, None).await?;
    Ok(())
}

pub async fn signup(api: &ApiClient, req: &SignupRequest) -> Result<(), ApiError> {
    let body = serde_json::to_value(req).unwrap_or(Value::Null);
    api.post(SIGNUP_ENDPOINT, Some(&body)).await?;
    Ok(())
}

pub async fn fetch_profile(api: &ApiClient) -> Result<SessionUser, ApiError> {
    let resp = api.get(PROFILE_ENDPOINT).await?;
    Ok(resp
        .body
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// PATCH the SSH key. Returns the profile echoed by the backend, when it sends one.
pub async fn update_profile(api: &ApiClient, update: &ProfileUpdate) -> Result<Option<SessionUser>, ApiError> {
    let body = serde_json::to_value(update).unwrap_or(Value::Null);
    let resp = api.patch(PROFILE_ENDPOINT, &body).await?;
    Ok(resp.body.and_then(|v| serde_json::from_value(v).ok()))
}
