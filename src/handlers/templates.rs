use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::models::TemplateInfo;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents/templates", get(list))
        .route("/documents/templates/:name", get(get_template))
        .route("/documents/templates/images/:image", get(get_image))
}

async fn list(State(state): State<AppState>) -> Json<Vec<TemplateInfo>> {
    Json(state.templates.available())
}

/// Template HTML with header/footer images embedded as base64 data URLs.
async fn get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(
        state.templates.content_with_embedded_images(&name).await?,
    ))
}

async fn get_image(
    State(state): State<AppState>,
    Path(image): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.templates.image(&image).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
