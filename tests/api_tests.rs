mod common;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use synapse::api::{auth, images, instances, ApiClient};
use synapse::forms::{validate_launch, FormErrors, NETWORK_FAILURE_MESSAGE};
use synapse::models::{InstanceAction, LaunchRequest};

use common::{spawn_backend, Backend, CSRF_TOKEN, RUNNING_INSTANCE};

async fn logged_in_client(backend: &Arc<Backend>) -> ApiClient {
    let url = spawn_backend(backend.clone()).await;
    let api = ApiClient::new(&url).unwrap();
    auth::login(&api, "alice", "secret").await.unwrap();
    api
}

#[tokio::test]
async fn list_shapes_normalize_to_vectors() {
    synapse::api::client::set_silent(true);
    let backend = Arc::new(Backend::default());
    let api = logged_in_client(&backend).await;

    backend.set_instances(StatusCode::OK, RUNNING_INSTANCE);
    let rows = instances::list_instances(&api).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].instance_id, "abc123def456789");

    backend.set_instances(StatusCode::OK, &format!(r#"{{"count":1,"results":{}}}"#, RUNNING_INSTANCE));
    assert_eq!(instances::list_instances(&api).await.unwrap().len(), 1);

    backend.set_instances(StatusCode::OK, "");
    assert!(instances::list_instances(&api).await.unwrap().is_empty());

    backend.set_instances(StatusCode::NO_CONTENT, "");
    assert!(instances::list_instances(&api).await.unwrap().is_empty());

    backend.set_instances(StatusCode::OK, r#"{"instances":[]}"#);
    assert!(instances::list_instances(&api).await.unwrap().is_empty());

    *backend.images.lock().unwrap() = json!({"results": [
        {"id": 7, "name": "PyTorch", "custom_registry_image_name": "reg/pytorch:2.3", "is_available": true}
    ]});
    let imgs = images::list_images(&api).await.unwrap();
    assert_eq!(imgs.len(), 1);
    assert_eq!(imgs[0].tag, "reg/pytorch:2.3");
}

#[tokio::test]
async fn non_2xx_lists_carry_the_backend_message() {
    synapse::api::client::set_silent(true);
    let backend = Arc::new(Backend::default());
    let api = logged_in_client(&backend).await;

    backend.set_instances(StatusCode::SERVICE_UNAVAILABLE, r#"{"detail":"Scheduler offline"}"#);
    let err = instances::list_instances(&api).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(err.page_message(), "Scheduler offline");

    backend.set_instances(StatusCode::BAD_GATEWAY, "");
    let err = instances::list_instances(&api).await.unwrap_err();
    assert_eq!(err.page_message(), "HTTP 502 Bad Gateway");
}

#[tokio::test]
async fn anonymous_list_is_unauthorized() {
    synapse::api::client::set_silent(true);
    let backend = Arc::new(Backend::default());
    let url = spawn_backend(backend.clone()).await;
    let api = ApiClient::new(&url).unwrap();

    let err = instances::list_instances(&api).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(auth::fetch_profile(&api).await.is_err());
}

#[tokio::test]
async fn mutating_requests_echo_the_csrf_cookie() {
    synapse::api::client::set_silent(true);
    let backend = Arc::new(Backend::default());
    let api = logged_in_client(&backend).await;
    assert_eq!(api.csrf_token().as_deref(), Some(CSRF_TOKEN));

    let message = instances::instance_action(&api, "abc123def456789", InstanceAction::Stop)
        .await
        .unwrap();
    assert_eq!(message.as_deref(), Some("ok"));

    let seen = backend.csrf_seen.lock().unwrap().clone();
    // The login itself went out before any cookie existed.
    assert_eq!(seen.first(), Some(&None));
    assert_eq!(seen.last(), Some(&Some(CSRF_TOKEN.to_string())));
    assert_eq!(
        backend.action_calls.lock().unwrap().as_slice(),
        ["abc123def456789:stop".to_string()]
    );
}

#[tokio::test]
async fn launch_field_errors_map_to_the_form() {
    synapse::api::client::set_silent(true);
    let backend = Arc::new(Backend::default());
    let api = logged_in_client(&backend).await;
    *backend.create_reply.lock().unwrap() = (StatusCode::BAD_REQUEST, json!({"n_gpus": ["must be at least 1"]}));

    let req = LaunchRequest {
        image_id: "7".into(),
        n_gpus: 2,
    };
    let err = instances::launch_instance(&api, &req).await.unwrap_err();
    let errors = FormErrors::from_api_error(&err);
    assert_eq!(errors.field("n_gpus"), Some("must be at least 1"));
    assert_eq!(errors.banner_text(), Some("Please correct the errors highlighted below."));
    assert_eq!(backend.create_calls(), 1);
}

#[tokio::test]
async fn launch_success_reports_the_new_id() {
    synapse::api::client::set_silent(true);
    let backend = Arc::new(Backend::default());
    let api = logged_in_client(&backend).await;

    let req = validate_launch("7", "1").unwrap();
    let resp = instances::launch_instance(&api, &req).await.unwrap();
    assert_eq!(resp.instance_id.as_deref(), Some("new123"));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    synapse::api::client::set_silent(true);
    // Bind then drop so the port is closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::new(&format!("http://{}", addr)).unwrap();
    let err = instances::list_instances(&api).await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(FormErrors::from_api_error(&err).banner_text(), Some(NETWORK_FAILURE_MESSAGE));
}
