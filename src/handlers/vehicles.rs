use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::models::{VehiclePayload, VehicleView};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list).post(create))
        .route(
            "/vehicles/:id",
            get(get_by_id)
                .put(full_update)
                .patch(partial_update)
                .delete(remove),
        )
        .route("/vehicles/vin/:vin", get(get_by_vin))
        .route("/vehicles/plate/:plate", get(get_by_plate))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<VehicleView>>, ApiError> {
    Ok(Json(state.vehicles.find_all().await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VehicleView>, ApiError> {
    Ok(Json(state.vehicles.find_by_id(id).await?))
}

async fn get_by_vin(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<VehicleView>, ApiError> {
    Ok(Json(state.vehicles.find_by_vin(&vin).await?))
}

async fn get_by_plate(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> Result<Json<VehicleView>, ApiError> {
    Ok(Json(state.vehicles.find_by_licence_plate(&plate).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<VehiclePayload>,
) -> Result<(StatusCode, Json<VehicleView>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.vehicles.save(payload).await?)))
}

async fn full_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<VehiclePayload>,
) -> Result<Json<VehicleView>, ApiError> {
    Ok(Json(state.vehicles.full_update(id, payload).await?))
}

async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<VehiclePayload>,
) -> Result<Json<VehicleView>, ApiError> {
    Ok(Json(state.vehicles.partial_update(id, payload).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.vehicles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
