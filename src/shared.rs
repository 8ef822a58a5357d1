use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::game::{GameService, GameSettings};
use crate::websockets::{ConnectionManager, InMemoryConnectionManager};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub game_service: GameService,
    pub connection_manager: Arc<dyn ConnectionManager>,
}

impl AppState {
    pub fn new(game_service: GameService, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            game_service,
            connection_manager,
        }
    }

    /// In-memory state wired with the given game settings
    pub fn in_memory(settings: GameSettings) -> Self {
        let connection_manager: Arc<dyn ConnectionManager> =
            Arc::new(InMemoryConnectionManager::new());
        let game_service = GameService::new(connection_manager.clone(), settings);
        Self::new(game_service, connection_manager)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
