use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::game::{GameError, GameService};
use crate::shared::AppState;

use super::connection_manager::ConnectionId;
use super::messages::ClientMessage;
use super::socket::{Connection, MessageHandler};

/// Message handler for receiving WebSocket messages from the client
pub struct WebsocketReceiveHandler {
    game_service: GameService,
}

impl WebsocketReceiveHandler {
    pub fn new(game_service: GameService) -> Self {
        Self { game_service }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: ConnectionId, message: String) {
        debug!(
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        // Rejections are reported to the sender only
        let result = match ClientMessage::parse(&message) {
            Ok(client_message) => {
                let message_type = client_message.message_type();
                self.game_service
                    .handle_client_message(connection_id, client_message)
                    .await
                    .inspect_err(|e| {
                        debug!(
                            connection_id = %connection_id,
                            message_type,
                            error = %e,
                            "Request rejected"
                        )
                    })
            }
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                Err(GameError::malformed(e.to_string()))
            }
        };

        if let Err(error) = result {
            self.game_service.send_error(connection_id, &error).await;
        }
    }
}

/// WebSocket endpoint. Every upgraded socket becomes one protocol session.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id = ConnectionId::new();
    info!(connection_id = %connection_id, "A new client connected");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(connection_id, outbound_sender)
        .await;

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.game_service.clone()));
    let connection = Connection::new(
        connection_id,
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "WebSocket connection error");
        }
    }

    // Cleanup: stop delivering to this socket, then leave every room
    app_state
        .connection_manager
        .remove_connection(connection_id)
        .await;
    app_state.game_service.handle_disconnect(connection_id).await;

    info!(connection_id = %connection_id, "A client disconnected");
}
