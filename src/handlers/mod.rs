use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
pub mod clients;
pub mod files;
pub mod parts;
pub mod repair_parts;
pub mod repairs;
pub mod templates;
pub mod vehicles;

/// Assemble the full application router. Everything under `/api/v1` except
/// the auth routes sits behind the JWT middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::routes())
        .merge(protected_routes(state.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(clients::routes())
        .merge(vehicles::routes())
        .merge(repairs::routes())
        .merge(parts::routes())
        .merge(repair_parts::routes())
        .merge(files::routes())
        .merge(templates::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::require_jwt,
        ))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
