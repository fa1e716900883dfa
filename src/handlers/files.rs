use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::models::FileView;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/repairs/:id/files", get(list_for_repair).post(upload))
        .route("/repairs/:id/files/:file_id", get(download).delete(remove))
}

async fn list_for_repair(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FileView>>, ApiError> {
    Ok(Json(state.files.list_for_repair(id).await?))
}

/// POST /api/v1/repairs/{id}/files - multipart upload, single `file` field
async fn upload(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Missing filename in file field"))?;
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file field: {e}")))?;

        state
            .files
            .upload(id, &filename, content_type.as_deref(), &bytes)
            .await?;
        return Ok(StatusCode::OK);
    }

    Err(ApiError::bad_request("Missing file field in multipart body"))
}

/// GET /api/v1/repairs/{id}/files/{fileId} - inline binary download
async fn download(
    State(state): State<AppState>,
    Path((_, file_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let (file, bytes) = state.files.load(file_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", file.filename),
            ),
        ],
        bytes,
    ))
}

async fn remove(
    State(state): State<AppState>,
    Path((_, file_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state.files.delete(file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
