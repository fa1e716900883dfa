use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::models::{RepairPartPayload, RepairPartView};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/repair-parts", get(list).post(create))
        .route(
            "/repair-parts/:id",
            get(get_by_id).patch(partial_update).delete(remove),
        )
        .route("/repairs/:id/repair-parts", get(list_for_repair))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<RepairPartView>>, ApiError> {
    Ok(Json(state.repair_parts.find_all().await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RepairPartView>, ApiError> {
    Ok(Json(state.repair_parts.find_by_id(id).await?))
}

async fn list_for_repair(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RepairPartView>>, ApiError> {
    Ok(Json(state.repair_parts.find_by_repair_id(id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<RepairPartPayload>,
) -> Result<(StatusCode, Json<RepairPartView>), ApiError> {
    Ok((
        StatusCode::CREATED,
        Json(state.repair_parts.save(payload).await?),
    ))
}

async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RepairPartPayload>,
) -> Result<Json<RepairPartView>, ApiError> {
    Ok(Json(state.repair_parts.partial_update(id, payload).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.repair_parts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
