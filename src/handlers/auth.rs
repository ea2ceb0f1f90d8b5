use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::api::auth;
use crate::forms::{login_failure_message, validate_signup, FormErrors, SignupInput, SIGNUP_FIELDS};
use crate::guard::safe_next;
use crate::models::{AppState, SessionUser};
use crate::templates::{LoginTemplate, SignupTemplate};

use super::helpers::{
    backend_unavailable, build_page_context, drop_session, insert_session, redirect_with_flash, render_template,
    session_from_jar, session_or_scratch,
};

#[derive(Deserialize, Default)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

fn landing(next: Option<&str>) -> String {
    safe_next(next).unwrap_or("/").to_string()
}

pub async fn login_get(State(state): State<AppState>, jar: CookieJar, Query(q): Query<NextQuery>) -> Response {
    let session = session_from_jar(&state, &jar);
    if session.as_ref().map(|s| s.identity.is_authenticated()).unwrap_or(false) {
        return Redirect::to(&landing(q.next.as_deref())).into_response();
    }
    render_template(LoginTemplate {
        page: build_page_context(&state, session.as_deref()),
        identifier: String::new(),
        next: q.next.unwrap_or_default(),
        error: None,
    })
}

pub async fn login_post(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let (existing, api) = match session_or_scratch(&state, &jar) {
        Ok(v) => v,
        Err(e) => return backend_unavailable(&e),
    };
    let identifier = form.identifier.trim().to_string();

    if let Err(e) = auth::login(&api, &identifier, &form.password).await {
        tracing::info!(error = %e, "login rejected");
        return render_template(LoginTemplate {
            page: build_page_context(&state, existing.as_deref()),
            identifier,
            next: form.next.unwrap_or_default(),
            error: Some(login_failure_message(&e)),
        });
    }

    let (jar, session) = match existing {
        Some(session) => (jar, session),
        None => insert_session(&state, jar, api),
    };

    let mut user = match auth::fetch_profile(&session.api).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "profile fetch after login failed, using login identifier");
            let (username, email) = if identifier.contains('@') {
                (String::new(), identifier.clone())
            } else {
                (identifier.clone(), String::new())
            };
            SessionUser {
                username,
                email,
                is_authenticated: true,
                ..Default::default()
            }
        }
    };
    user.is_authenticated = true;
    session.reset();
    tracing::info!(user = %user.display_name(), "logged in");
    session.identity.set(user);
    (jar, Redirect::to(&landing(form.next.as_deref()))).into_response()
}

pub async fn signup_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let session = session_from_jar(&state, &jar);
    render_template(SignupTemplate {
        page: build_page_context(&state, session.as_deref()),
        form: SignupInput::default(),
        errors: FormErrors::default(),
    })
}

pub async fn signup_post(State(state): State<AppState>, jar: CookieJar, Form(form): Form<SignupInput>) -> Response {
    let (existing, api) = match session_or_scratch(&state, &jar) {
        Ok(v) => v,
        Err(e) => return backend_unavailable(&e),
    };
    let result = match validate_signup(&form) {
        Ok(req) => auth::signup(&api, &req).await.map_err(|e| {
            tracing::info!(error = %e, "signup rejected");
            FormErrors::from_api_error(&e).keep_fields(SIGNUP_FIELDS)
        }),
        Err(errors) => Err(errors),
    };
    match result {
        Ok(()) => {
            // The flash needs a session to ride on.
            let (jar, session) = match existing {
                Some(session) => (jar, session),
                None => insert_session(&state, jar, api),
            };
            (jar, redirect_with_flash(&session, "Signup successful! Please log in.", "/login")).into_response()
        }
        Err(errors) => render_template(SignupTemplate {
            page: build_page_context(&state, existing.as_deref()),
            form: SignupInput {
                password: String::new(),
                password2: String::new(),
                ..form
            },
            errors,
        }),
    }
}

pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(session) = session_from_jar(&state, &jar) {
        if let Err(e) = auth::logout(&session.api).await {
            tracing::warn!(error = %e, "backend logout failed");
        }
        session.reset();
    }
    (drop_session(&state, jar), Redirect::to("/login")).into_response()
}
