use serde_json::{json, Value};

use trivia_server::{
    room::RoomCode,
    websockets::{ConnectionId, ConnectionManager, MessageHandler, ServerMessage},
};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Feed a raw text frame through the WebSocket message handler
    pub async fn send_raw(&self, connection_id: ConnectionId, text: &str) {
        self.input_handler
            .handle_message(connection_id, text.to_string())
            .await;
    }

    /// Send a JSON message through the WebSocket message handler
    pub async fn send_json(&self, connection_id: ConnectionId, message: Value) {
        self.send_raw(connection_id, &message.to_string()).await;
    }

    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    /// Disconnect as the transport does: drop the socket, then leave every room
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        self.mock_conn_manager.remove_connection(connection_id).await;
        self.game_service.handle_disconnect(connection_id).await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Create a room and return its code, consuming the `room-joined` reply
    pub async fn create_room(&self, connection_id: ConnectionId, username: &str) -> RoomCode {
        self.send_json(
            connection_id,
            json!({ "type": "create-room", "username": username }),
        )
        .await;
        self.expect_room_joined(connection_id).await
    }

    pub async fn send_join(&self, connection_id: ConnectionId, room_code: &str, username: &str) {
        self.send_json(
            connection_id,
            json!({ "type": "join-room", "roomCode": room_code, "username": username }),
        )
        .await;
    }

    pub async fn send_start_game(&self, connection_id: ConnectionId, room_code: &str) {
        self.send_json(
            connection_id,
            json!({ "type": "start-game", "roomCode": room_code }),
        )
        .await;
    }

    pub async fn send_answer(&self, connection_id: ConnectionId, room_code: &str, answer: Value) {
        self.send_json(
            connection_id,
            json!({ "type": "answer", "roomCode": room_code, "answer": answer }),
        )
        .await;
    }

    async fn expect_room_joined(&self, connection_id: ConnectionId) -> RoomCode {
        let raw = self
            .mock_conn_manager
            .consume_message_for(connection_id)
            .await
            .expect("creator should receive room-joined");
        match serde_json::from_str::<ServerMessage>(&raw).unwrap() {
            ServerMessage::RoomJoined { room_code } => room_code,
            other => panic!("expected room-joined, got {:?}", other),
        }
    }
}
