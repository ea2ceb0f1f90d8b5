use serde_json::Value;

use crate::models::{Image, NewImage};

use super::client::ApiClient;
use super::error::ApiError;
use super::normalize::normalize_collection;

pub const LIST_ENDPOINT: &str = "/api/image/list/";
pub const CREATE_ENDPOINT: &str = "/api/image/create/";

pub async fn list_images(api: &ApiClient) -> Result<Vec<Image>, ApiError> {
    let resp = api.get(LIST_ENDPOINT).await?;
    Ok(normalize_collection(resp.body))
}

pub async fn create_image(api: &ApiClient, image: &NewImage) -> Result<Option<Image>, ApiError> {
    let body = serde_json::to_value(image).unwrap_or(Value::Null);
    let resp = api.post(CREATE_ENDPOINT, Some(&body)).await?;
    Ok(resp.body.and_then(|v| serde_json::from_value(v).ok()))
}
