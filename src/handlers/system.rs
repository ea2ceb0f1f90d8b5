use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::AppState;
use crate::templates::NotFoundTemplate;

use super::helpers::{build_page_context, render_template, session_from_jar};

pub const DEFAULT_STYLESHEET: &str = include_str!("../../static/styles.css");

pub async fn stylesheet_get() -> Response {
    ([(axum::http::header::CONTENT_TYPE, "text/css")], DEFAULT_STYLESHEET).into_response()
}

pub async fn not_found(State(state): State<AppState>, jar: CookieJar, OriginalUri(uri): OriginalUri) -> Response {
    let session = session_from_jar(&state, &jar);
    let page = NotFoundTemplate {
        page: build_page_context(&state, session.as_deref()),
        path: uri.path().to_string(),
    };
    (StatusCode::NOT_FOUND, render_template(page)).into_response()
}
