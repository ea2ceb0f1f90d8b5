use std::sync::Arc;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::RngCore;

use crate::api::{ApiClient, ApiError};
use crate::models::state::lock;
use crate::models::{AppState, DashboardSession};
use crate::templates::PageContext;
use crate::utils::hostname_from_url;

pub const SESSION_COOKIE: &str = "synapse_session";

pub fn random_session_id() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex::encode(b)
}

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn session_from_jar(state: &AppState, jar: &CookieJar) -> Option<Arc<DashboardSession>> {
    let sid = session_id_from_jar(jar)?;
    lock(&state.sessions).get(&sid).cloned()
}

/// Registers a session around `api` and hands the browser its cookie.
pub fn insert_session(state: &AppState, jar: CookieJar, api: ApiClient) -> (CookieJar, Arc<DashboardSession>) {
    let session = Arc::new(DashboardSession::new(api));
    let sid = random_session_id();
    lock(&state.sessions).insert(sid.clone(), session.clone());
    tracing::debug!("created dashboard session");

    let mut cookie = Cookie::new(SESSION_COOKIE, sid);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    (jar.add(cookie), session)
}

/// Backend client for a form post: the browser's own session client, or a
/// fresh one that only becomes a session once the post succeeds.
pub fn session_or_scratch(
    state: &AppState,
    jar: &CookieJar,
) -> Result<(Option<Arc<DashboardSession>>, ApiClient), ApiError> {
    match session_from_jar(state, jar) {
        Some(session) => {
            let api = session.api.clone();
            Ok((Some(session), api))
        }
        None => Ok((None, ApiClient::new(&state.settings.api_base_url)?)),
    }
}

pub fn drop_session(state: &AppState, jar: CookieJar) -> CookieJar {
    if let Some(sid) = session_id_from_jar(&jar) {
        lock(&state.sessions).remove(&sid);
    }
    jar.remove(Cookie::from(SESSION_COOKIE))
}

/// Layout context for a page view. Consumes pending flash messages.
pub fn build_page_context(state: &AppState, session: Option<&DashboardSession>) -> PageContext {
    PageContext {
        current_user: session.and_then(|s| s.identity.current()),
        api_hostname: hostname_from_url(&state.settings.api_base_url),
        flash_messages: session.map(|s| s.take_flash()).unwrap_or_default(),
    }
}

pub fn render_template<T: Template>(t: T) -> Response {
    match t.render() {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub fn redirect_with_flash(session: &DashboardSession, message: impl Into<String>, to: &str) -> Response {
    session.push_flash(message);
    Redirect::to(to).into_response()
}

pub fn backend_unavailable(e: &ApiError) -> Response {
    tracing::error!(error = %e, "cannot create backend client");
    (StatusCode::INTERNAL_SERVER_ERROR, "Backend client could not be created").into_response()
}

/// Records a 401 from the backend on the session identity.
pub fn observe<T>(session: &DashboardSession, result: &Result<T, ApiError>) {
    session.identity.observe(result);
}
