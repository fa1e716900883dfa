use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::models::{ClientPayload, ClientView};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list).post(create))
        .route(
            "/clients/:id",
            get(get_by_id)
                .put(full_update)
                .patch(partial_update)
                .delete(remove),
        )
        .route("/clients/surname/:surname", get(list_by_surname))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClientView>>, ApiError> {
    Ok(Json(state.clients.find_all().await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClientView>, ApiError> {
    Ok(Json(state.clients.find_by_id(id).await?))
}

async fn list_by_surname(
    State(state): State<AppState>,
    Path(surname): Path<String>,
) -> Result<Json<Vec<ClientView>>, ApiError> {
    Ok(Json(state.clients.find_by_surname(&surname).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<ClientView>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.clients.save(payload).await?)))
}

async fn full_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<ClientView>, ApiError> {
    Ok(Json(state.clients.full_update(id, payload).await?))
}

async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<ClientView>, ApiError> {
    Ok(Json(state.clients.partial_update(id, payload).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.clients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
