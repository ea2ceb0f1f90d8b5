use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;

use crate::handlers;
use crate::models::AppState;

pub fn build_router(state: AppState) -> Router {
    // Staff only; the auth check runs first inside the staff guard.
    let admin_routes = Router::new()
        .route("/servers", get(handlers::servers::servers_get))
        .route(
            "/servers/add",
            get(handlers::servers::server_add_get).post(handlers::servers::server_add_post),
        )
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), handlers::middleware::staff_middleware));

    let protected_routes = Router::new()
        .route("/", get(handlers::instances::instances_get))
        .route("/instances", get(handlers::instances::instances_get))
        .route(
            "/instances/launch",
            get(handlers::instances::launch_get).post(handlers::instances::launch_post),
        )
        .route("/instances/:instance_id/:action", post(handlers::instances::instance_action_post))
        .route("/images", get(handlers::images::images_get))
        .route(
            "/images/define",
            get(handlers::images::image_define_get).post(handlers::images::image_define_post),
        )
        .route("/profile", get(handlers::profile::profile_get).post(handlers::profile::profile_post))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), handlers::middleware::auth_middleware));

    Router::new()
        .route("/login", get(handlers::auth::login_get).post(handlers::auth::login_post))
        .route("/signup", get(handlers::auth::signup_get).post(handlers::auth::signup_post))
        .route("/logout", post(handlers::auth::logout_post))
        .route(
            "/static/styles.css",
            get(handlers::system::stylesheet_get).layer(
                ServiceBuilder::new().layer(SetResponseHeaderLayer::if_not_present(
                    CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=3600"),
                )),
            ),
        )
        .merge(protected_routes)
        .merge(admin_routes)
        .fallback(handlers::system::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::path::PathBuf;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::config::Settings;

    fn router() -> Router {
        build_router(AppState::new(Settings {
            api_base_url: "http://127.0.0.1:9".into(),
            poll_interval: Duration::from_secs(20),
            settle_delay: Duration::from_secs(3),
            session_file: PathBuf::from("unused.json"),
        }))
    }

    async fn get(path: &str) -> axum::response::Response {
        router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn stylesheet_is_public_and_cached() {
        let resp = get("/static/styles.css").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "public, max-age=3600");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/css");
    }

    #[tokio::test]
    async fn guarded_subtrees_redirect_anonymous_visitors() {
        for (path, location) in [
            ("/", "/login"),
            ("/instances/launch", "/login?next=%2Finstances%2Flaunch"),
            ("/profile?edit=1", "/login?next=%2Fprofile%3Fedit%3D1"),
            ("/servers/add", "/login?next=%2Fservers%2Fadd"),
        ] {
            let resp = get(path).await;
            assert!(resp.status().is_redirection(), "{}", path);
            assert_eq!(resp.headers()[header::LOCATION], location);
        }
    }

    #[tokio::test]
    async fn public_pages_render_without_a_session() {
        assert_eq!(get("/login").await.status(), StatusCode::OK);
        assert_eq!(get("/signup").await.status(), StatusCode::OK);
        assert_eq!(get("/missing").await.status(), StatusCode::NOT_FOUND);
    }
}
