use std::future::Future;

use serde_json::Value;

use crate::models::{Instance, InstanceAction, LaunchRequest, LaunchResponse};

use super::client::ApiClient;
use super::error::ApiError;
use super::normalize::normalize_collection;

pub const LIST_ENDPOINT: &str = "/api/instance/list/";
pub const CREATE_ENDPOINT: &str = "/api/instance/create/";

pub fn action_endpoint(instance_id: &str, action: InstanceAction) -> String {
    format!("/api/instances/{}/{}/", urlencoding::encode(instance_id), action.as_str())
}

pub async fn list_instances(api: &ApiClient) -> Result<Vec<Instance>, ApiError> {
    let resp = api.get(LIST_ENDPOINT).await?;
    Ok(normalize_collection(resp.body))
}

pub async fn launch_instance(api: &ApiClient, req: &LaunchRequest) -> Result<LaunchResponse, ApiError> {
    let body = serde_json::to_value(req).unwrap_or(Value::Null);
    let resp = api.post(CREATE_ENDPOINT, Some(&body)).await?;
    Ok(resp
        .body
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// Start or stop an instance. Returns the backend's `message`/`detail`, if any.
pub async fn instance_action(api: &ApiClient, instance_id: &str, action: InstanceAction) -> Result<Option<String>, ApiError> {
    let resp = api.post(&action_endpoint(instance_id, action), None).await?;
    Ok(resp.body.as_ref().and_then(|b| {
        ["message", "detail"]
            .iter()
            .find_map(|k| b.get(*k).and_then(|v| v.as_str()).map(str::to_string))
    }))
}

/// What the instance list controller needs from a backend.
pub trait InstanceBackend: Send + Sync + 'static {
    fn list_instances(&self) -> impl Future<Output = Result<Vec<Instance>, ApiError>> + Send;
    fn instance_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;
}

impl InstanceBackend for ApiClient {
    fn list_instances(&self) -> impl Future<Output = Result<Vec<Instance>, ApiError>> + Send {
        list_instances(self)
    }

    fn instance_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send {
        instance_action(self, instance_id, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_paths() {
        assert_eq!(action_endpoint("abc123", InstanceAction::Start), "/api/instances/abc123/start/");
        assert_eq!(action_endpoint("a b", InstanceAction::Stop), "/api/instances/a%20b/stop/");
    }
}
