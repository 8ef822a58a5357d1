use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use trivia_server::game::UsernameGenerator;
use trivia_server::websockets::{ConnectionId, ConnectionManager};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every outbound message per connection instead of writing to a socket
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<ConnectionId, VecDeque<String>>>>,
    connected: Arc<RwLock<HashSet<ConnectionId>>>,
    closed: Arc<RwLock<HashSet<ConnectionId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
            connected: Arc::new(RwLock::new(HashSet::new())),
            closed: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub async fn add_connected(&self, connection_id: ConnectionId) {
        self.connected.write().await.insert(connection_id);
    }

    /// Simulates a socket whose outbound channel has already closed
    pub async fn mark_closed(&self, connection_id: ConnectionId) {
        self.closed.write().await.insert(connection_id);
    }

    pub async fn get_messages_for(&self, connection_id: ConnectionId) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(&connection_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn consume_message_for(&self, connection_id: ConnectionId) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(&connection_id)
            .and_then(|queue| queue.pop_front())
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(
        &self,
        connection_id: ConnectionId,
        _sender: mpsc::UnboundedSender<String>,
    ) {
        self.add_connected(connection_id).await;
    }

    async fn remove_connection(&self, connection_id: ConnectionId) {
        self.connected.write().await.remove(&connection_id);
    }

    async fn send_to_connection(&self, connection_id: ConnectionId, message: &str) -> bool {
        if self.closed.read().await.contains(&connection_id)
            || !self.connected.read().await.contains(&connection_id)
        {
            return false;
        }
        self.sent_messages
            .write()
            .await
            .entry(connection_id)
            .or_default()
            .push_back(message.to_string());
        true
    }

    async fn send_to_connections(&self, connection_ids: &[ConnectionId], message: &str) {
        for connection_id in connection_ids {
            self.send_to_connection(*connection_id, message).await;
        }
    }

    async fn connection_count(&self) -> usize {
        self.connected.read().await.len()
    }
}

/// Always hands out the same guest name
pub struct FixedUsernameGenerator(pub &'static str);

impl UsernameGenerator for FixedUsernameGenerator {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}
