use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::api::{images, instances};
use crate::forms::{validate_launch, FormErrors, LAUNCH_FIELDS};
use crate::guard::login_redirect;
use crate::models::state::lock;
use crate::models::{AppState, DashboardSession, InstanceAction};
use crate::reconcile::Rejection;
use crate::templates::{ImageOption, InstanceRow, InstancesTemplate, LaunchTemplate};

use super::helpers::{build_page_context, observe, redirect_with_flash, render_template, session_from_jar};

/// Refetch the instance list into the session's board and restart the
/// poll clock.
async fn refresh_board(session: &DashboardSession) {
    let result = instances::list_instances(&session.api).await;
    observe(session, &result);
    lock(&session.board).apply_fetch(result);
    lock(&session.schedule).mark_refreshed(Instant::now());
}

fn require_session(state: &AppState, jar: &CookieJar) -> Result<Arc<DashboardSession>, Response> {
    session_from_jar(state, jar).ok_or_else(|| Redirect::to("/login").into_response())
}

pub async fn instances_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let poll = state.settings.poll_interval;
    let due = lock(&session.schedule).is_due(Instant::now(), poll);
    if due {
        refresh_board(&session).await;
        if !session.identity.is_authenticated() {
            return Redirect::to(&login_redirect("/")).into_response();
        }
    }

    let (rows, error, notice) = {
        let mut board = lock(&session.board);
        let rows = board
            .rows()
            .iter()
            .map(|inst| InstanceRow::new(inst, board.is_in_flight(&inst.instance_id)))
            .collect::<Vec<_>>();
        let error = board.error().map(str::to_string);
        (rows, error, board.take_notice())
    };
    let refresh_secs = lock(&session.schedule).reload_after(Instant::now(), poll);

    render_template(InstancesTemplate {
        page: build_page_context(&state, Some(&*session)),
        rows,
        error,
        notice,
        refresh_secs,
    })
}

pub async fn instance_action_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path((instance_id, action)): Path<(String, String)>,
) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let Some(action) = InstanceAction::parse(&action) else {
        return (StatusCode::NOT_FOUND, "Unknown action").into_response();
    };

    let admitted = lock(&session.board).begin_action(&instance_id, action);
    let ticket = match admitted {
        Ok(ticket) => ticket,
        Err(Rejection::InFlight(_)) => return Redirect::to("/").into_response(),
        Err(rejection) => {
            tracing::info!(%rejection, "instance action not offered");
            return Redirect::to("/").into_response();
        }
    };

    let outcome = instances::instance_action(&session.api, &instance_id, action).await;
    observe(&session, &outcome);
    let follow_up = lock(&session.board).complete_action(ticket, outcome, state.settings.settle_delay);
    let refetch_now = lock(&session.schedule).follow_up(Instant::now(), follow_up);
    if refetch_now {
        refresh_board(&session).await;
    }
    Redirect::to("/").into_response()
}

#[derive(Deserialize)]
pub struct LaunchForm {
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub n_gpus: String,
}

async fn launch_page(state: &AppState, session: &DashboardSession, selected: &str, n_gpus: String, errors: FormErrors) -> Response {
    let result = images::list_images(&session.api).await;
    observe(session, &result);
    let (images, load_error) = match result {
        Ok(list) => (list, None),
        Err(e) => (Vec::new(), Some(format!("Failed to load necessary image data: {}", e.page_message()))),
    };
    let images = images
        .iter()
        .filter(|img| img.is_available)
        .map(|img| ImageOption {
            id: img.id.clone(),
            label: img.picker_label(),
            selected: img.id == selected,
        })
        .collect();
    render_template(LaunchTemplate {
        page: build_page_context(state, Some(session)),
        images,
        load_error,
        n_gpus,
        errors,
    })
}

pub async fn launch_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    match require_session(&state, &jar) {
        Ok(session) => launch_page(&state, &session, "", "1".to_string(), FormErrors::default()).await,
        Err(r) => r,
    }
}

pub async fn launch_post(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LaunchForm>) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let req = match validate_launch(&form.image_id, &form.n_gpus) {
        Ok(req) => req,
        Err(errors) => return launch_page(&state, &session, &form.image_id, form.n_gpus, errors).await,
    };

    let result = instances::launch_instance(&session.api, &req).await;
    observe(&session, &result);
    match result {
        Ok(resp) => {
            tracing::info!(instance_id = ?resp.instance_id, image_id = %req.image_id, "instance launch requested");
            lock(&session.schedule).expire();
            let id = resp.instance_id.as_deref().unwrap_or("N/A");
            redirect_with_flash(
                &session,
                format!("Instance launch initiated successfully (ID: {}). Check dashboard for status.", id),
                "/",
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "instance launch failed");
            let errors = FormErrors::from_api_error(&e).keep_fields(LAUNCH_FIELDS);
            launch_page(&state, &session, &form.image_id, form.n_gpus, errors).await
        }
    }
}
