use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::api::auth;
use crate::forms::{FormErrors, PROFILE_FIELDS};
use crate::models::{AppState, ProfileUpdate};
use crate::templates::ProfileTemplate;

use super::helpers::{build_page_context, observe, redirect_with_flash, render_template, session_from_jar};

#[derive(Deserialize, Default)]
pub struct ProfileQuery {
    pub edit: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub ssh_public_key: String,
}

pub async fn profile_get(State(state): State<AppState>, jar: CookieJar, Query(q): Query<ProfileQuery>) -> Response {
    let Some(session) = session_from_jar(&state, &jar) else {
        return Redirect::to("/login").into_response();
    };
    let result = auth::fetch_profile(&session.api).await;
    observe(&session, &result);
    let (profile, load_error) = match result {
        Ok(user) => {
            if user.is_authenticated {
                session.identity.set(user.clone());
            }
            (Some(user), None)
        }
        Err(e) => (
            session.identity.current(),
            Some(format!("Failed to load profile data: {}", e.page_message())),
        ),
    };
    let key_draft = profile
        .as_ref()
        .and_then(|p| p.ssh_public_key.clone())
        .unwrap_or_default();
    render_template(ProfileTemplate {
        page: build_page_context(&state, Some(&*session)),
        profile,
        load_error,
        editing: q.edit.is_some(),
        key_draft,
        errors: FormErrors::default(),
    })
}

pub async fn profile_post(State(state): State<AppState>, jar: CookieJar, Form(form): Form<ProfileForm>) -> Response {
    let Some(session) = session_from_jar(&state, &jar) else {
        return Redirect::to("/login").into_response();
    };
    let update = ProfileUpdate::from_input(&form.ssh_public_key);
    let result = auth::update_profile(&session.api, &update).await;
    observe(&session, &result);
    match result {
        Ok(updated) => {
            let user = updated.or_else(|| {
                session.identity.current().map(|mut u| {
                    u.ssh_public_key = update.ssh_public_key.clone();
                    u
                })
            });
            if let Some(user) = user {
                session.identity.set(user);
            }
            tracing::info!(cleared = update.ssh_public_key.is_none(), "ssh key updated");
            redirect_with_flash(&session, "SSH Key updated successfully!", "/profile")
        }
        Err(e) => {
            tracing::warn!(error = %e, "ssh key update failed");
            render_template(ProfileTemplate {
                page: build_page_context(&state, Some(&*session)),
                profile: session.identity.current(),
                load_error: None,
                editing: true,
                key_draft: form.ssh_public_key,
                errors: FormErrors::from_api_error(&e).keep_fields(PROFILE_FIELDS),
            })
        }
    }
}
