use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::servers;
use crate::forms::{validate_server, FormErrors, ServerInput, SERVER_FIELDS};
use crate::models::AppState;
use crate::templates::{ServerCreateTemplate, ServersTemplate};

use super::helpers::{build_page_context, observe, redirect_with_flash, render_template, session_from_jar};

const ACCESS_DENIED: &str = "Access Denied: You do not have permission to view servers.";

pub async fn servers_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(session) = session_from_jar(&state, &jar) else {
        return Redirect::to("/login").into_response();
    };
    let result = servers::list_servers(&session.api).await;
    observe(&session, &result);
    let (servers, error) = match result {
        Ok(list) => (list, None),
        Err(e) if e.status() == Some(StatusCode::FORBIDDEN) => (Vec::new(), Some(ACCESS_DENIED.to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "server list fetch failed");
            (Vec::new(), Some(format!("Failed to load servers: {}", e.page_message())))
        }
    };
    render_template(ServersTemplate {
        page: build_page_context(&state, Some(&*session)),
        servers,
        error,
    })
}

pub async fn server_add_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let session = session_from_jar(&state, &jar);
    render_template(ServerCreateTemplate {
        page: build_page_context(&state, session.as_deref()),
        form: ServerInput {
            is_active: Some("on".to_string()),
            ..Default::default()
        },
        errors: FormErrors::default(),
    })
}

pub async fn server_add_post(State(state): State<AppState>, jar: CookieJar, Form(form): Form<ServerInput>) -> Response {
    let Some(session) = session_from_jar(&state, &jar) else {
        return Redirect::to("/login").into_response();
    };
    let result = match validate_server(&form) {
        Ok(server) => {
            let created = servers::create_server(&session.api, &server).await;
            observe(&session, &created);
            created
                .map(|_| server.hostname)
                .map_err(|e| FormErrors::from_api_error(&e).keep_fields(SERVER_FIELDS))
        }
        Err(errors) => Err(errors),
    };
    match result {
        Ok(hostname) => {
            tracing::info!(%hostname, "server added");
            redirect_with_flash(&session, format!("Server {} created successfully.", hostname), "/servers")
        }
        Err(errors) => render_template(ServerCreateTemplate {
            page: build_page_context(&state, Some(&*session)),
            form,
            errors,
        }),
    }
}
