use axum::{extract::State, http::Uri, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::instrument;

use crate::shared::{AppError, AppState};
use crate::websockets::websocket_handler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rooms: usize,
    pub connections: usize,
}

/// Builds the application router.
///
/// `GET /` upgrades to the game WebSocket, `GET /health` reports live counts.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(websocket_handler))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[instrument(name = "health", skip(state))]
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        rooms: state.game_service.room_count().await,
        connections: state.connection_manager.connection_count().await,
    })
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
