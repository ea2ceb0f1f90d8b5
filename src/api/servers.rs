use serde_json::Value;

use crate::models::{NewServer, Server};

use super::client::ApiClient;
use super::error::ApiError;
use super::normalize::normalize_collection;

pub const LIST_ENDPOINT: &str = "/api/server/list/";
pub const CREATE_ENDPOINT: &str = "/api/server/create/";

pub async fn list_servers(api: &ApiClient) -> Result<Vec<Server>, ApiError> {
    let resp = api.get(LIST_ENDPOINT).await?;
    Ok(normalize_collection(resp.body))
}

pub async fn create_server(api: &ApiClient, server: &NewServer) -> Result<(), ApiError> {
    let body = serde_json::to_value(server).unwrap_or(Value::Null);
    api.post(CREATE_ENDPOINT, Some(&body)).await?;
    Ok(())
}
