use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::images;
use crate::forms::{validate_image, FormErrors, ImageInput, IMAGE_FIELDS};
use crate::models::AppState;
use crate::templates::{ImageCreateTemplate, ImageRow, ImagesTemplate};

use super::helpers::{build_page_context, observe, redirect_with_flash, render_template, session_from_jar};

pub async fn images_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(session) = session_from_jar(&state, &jar) else {
        return Redirect::to("/login").into_response();
    };
    let result = images::list_images(&session.api).await;
    observe(&session, &result);
    let (images, error) = match result {
        Ok(list) => (list.iter().map(ImageRow::from).collect(), None),
        Err(e) => {
            tracing::warn!(error = %e, "image list fetch failed");
            (Vec::new(), Some(format!("Failed to load images: {}", e.page_message())))
        }
    };
    render_template(ImagesTemplate {
        page: build_page_context(&state, Some(&*session)),
        images,
        error,
    })
}

pub async fn image_define_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let session = session_from_jar(&state, &jar);
    render_template(ImageCreateTemplate {
        page: build_page_context(&state, session.as_deref()),
        form: ImageInput {
            architecture: "x86_64".to_string(),
            is_available: Some("on".to_string()),
            ..Default::default()
        },
        errors: FormErrors::default(),
    })
}

pub async fn image_define_post(State(state): State<AppState>, jar: CookieJar, Form(form): Form<ImageInput>) -> Response {
    let Some(session) = session_from_jar(&state, &jar) else {
        return Redirect::to("/login").into_response();
    };
    let result = match validate_image(&form) {
        Ok(image) => {
            let created = images::create_image(&session.api, &image).await;
            observe(&session, &created);
            created
                .map(|_| image.name)
                .map_err(|e| FormErrors::from_api_error(&e).keep_fields(IMAGE_FIELDS))
        }
        Err(errors) => Err(errors),
    };
    match result {
        Ok(name) => {
            tracing::info!(%name, "image defined");
            redirect_with_flash(&session, format!("Image definition \"{}\" created successfully.", name), "/images")
        }
        Err(errors) => render_template(ImageCreateTemplate {
            page: build_page_context(&state, Some(&*session)),
            form,
            errors,
        }),
    }
}
