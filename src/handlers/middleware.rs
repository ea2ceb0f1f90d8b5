use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::guard::{require_authenticated, require_staff, GuardDecision};
use crate::models::{AppState, SessionUser};

use super::helpers::session_from_jar;

fn requested_location(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

async fn guarded(
    state: AppState,
    jar: CookieJar,
    request: Request,
    next: Next,
    check: fn(Option<&SessionUser>, &str) -> GuardDecision,
) -> Response {
    let session = session_from_jar(&state, &jar);
    let user = session.as_ref().and_then(|s| s.identity.current());
    let decision = check(user.as_ref(), &requested_location(&request));
    if let GuardDecision::RedirectHome { message } = &decision {
        if let Some(session) = &session {
            session.push_flash(*message);
        }
    }
    match decision.location() {
        None => next.run(request).await,
        Some(location) => {
            tracing::debug!(path = %request.uri().path(), %location, "guard redirect");
            Redirect::to(&location).into_response()
        }
    }
}

pub async fn auth_middleware(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    guarded(state, jar, request, next, require_authenticated).await
}

pub async fn staff_middleware(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    guarded(state, jar, request, next, require_staff).await
}
