use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{Part, PartPayload};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parts", get(list).post(create))
        .route("/parts/filter", get(list_by_filter))
        .route(
            "/parts/:id",
            get(get_by_id).patch(partial_update).delete(remove),
        )
}

/// Query parameters for the filtered search; blank values are wildcards.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartFilterQuery {
    part_name: Option<String>,
    serial_number: Option<String>,
    manufacturer: Option<String>,
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Part>>, ApiError> {
    Ok(Json(state.parts.find_all().await?))
}

async fn list_by_filter(
    State(state): State<AppState>,
    Query(query): Query<PartFilterQuery>,
) -> Result<Json<Vec<Part>>, ApiError> {
    Ok(Json(
        state
            .parts
            .find_by_filter(
                query.part_name.as_deref(),
                query.serial_number.as_deref(),
                query.manufacturer.as_deref(),
            )
            .await?,
    ))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Part>, ApiError> {
    Ok(Json(state.parts.find_by_id(id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PartPayload>,
) -> Result<(StatusCode, Json<Part>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.parts.save(payload).await?)))
}

async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PartPayload>,
) -> Result<Json<Part>, ApiError> {
    Ok(Json(state.parts.partial_update(id, payload).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.parts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
