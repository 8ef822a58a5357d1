use std::sync::Arc;
use tracing::debug;

use super::{connection_manager::ConnectionId, ConnectionManager, ServerMessage};
use crate::game::GameError;
use crate::room::models::Room;

pub struct MessageBroadcaster;

impl MessageBroadcaster {
    /// Serializes once and queues the message for every participant of the
    /// room. Connections that already closed are skipped by the manager.
    pub async fn broadcast_to_room(
        connection_manager: &Arc<dyn ConnectionManager>,
        room: &Room,
        message: &ServerMessage,
    ) -> Result<(), GameError> {
        let message_json = message.to_json()?;
        let connection_ids = room.connection_ids();

        debug!(
            room_code = %room.code,
            message_type = message.message_type(),
            recipients = connection_ids.len(),
            "Broadcasting to room"
        );

        connection_manager
            .send_to_connections(&connection_ids, &message_json)
            .await;
        Ok(())
    }

    pub async fn send_to_connection(
        connection_manager: &Arc<dyn ConnectionManager>,
        connection_id: ConnectionId,
        message: &ServerMessage,
    ) -> Result<(), GameError> {
        let message_json = message.to_json()?;
        connection_manager
            .send_to_connection(connection_id, &message_json)
            .await;
        Ok(())
    }
}
