use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::models::{RepairPayload, RepairView, RepairWithClientsView};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/repairs", get(list).post(create))
        .route("/repairs/withClients", get(list_with_clients))
        .route(
            "/repairs/:id",
            get(get_by_id)
                .put(full_update)
                .patch(partial_update)
                .delete(remove),
        )
        .route("/repairs/number/:number", get(get_by_number))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<RepairView>>, ApiError> {
    Ok(Json(state.repairs.find_all().await?))
}

async fn list_with_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<RepairWithClientsView>>, ApiError> {
    Ok(Json(state.repairs.find_all_with_clients().await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RepairView>, ApiError> {
    Ok(Json(state.repairs.find_by_id(id).await?))
}

async fn get_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<RepairView>, ApiError> {
    Ok(Json(state.repairs.find_by_number(&number).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<RepairPayload>,
) -> Result<(StatusCode, Json<RepairView>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.repairs.save(payload).await?)))
}

/// PUT resolves the path id, then runs the same create-or-replace as POST.
async fn full_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<RepairPayload>,
) -> Result<Json<RepairView>, ApiError> {
    state.repairs.find_by_id(id).await?;
    payload.id = Some(id);
    Ok(Json(state.repairs.save(payload).await?))
}

async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RepairPayload>,
) -> Result<Json<RepairView>, ApiError> {
    Ok(Json(state.repairs.partial_update(id, payload).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.repairs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
