use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Identity of one client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: ConnectionId, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, connection_id: ConnectionId);

    /// Queues a message for one connection. Closed or unknown connections are
    /// skipped; returns whether the message was queued.
    async fn send_to_connection(&self, connection_id: ConnectionId, message: &str) -> bool;

    async fn send_to_connections(&self, connection_ids: &[ConnectionId], message: &str);

    async fn connection_count(&self) -> usize;
}

pub struct InMemoryConnectionManager {
    // connection id -> outbound sender
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: ConnectionId, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        connections.remove(&connection_id);
    }

    async fn send_to_connection(&self, connection_id: ConnectionId, message: &str) -> bool {
        let connections = self.connections.read().await;
        match connections.get(&connection_id) {
            Some(sender) if !sender.is_closed() => sender.send(message.to_string()).is_ok(),
            Some(_) => {
                debug!(connection_id = %connection_id, "Skipping closed connection");
                false
            }
            None => {
                debug!(connection_id = %connection_id, "Skipping unknown connection");
                false
            }
        }
    }

    async fn send_to_connections(&self, connection_ids: &[ConnectionId], message: &str) {
        for connection_id in connection_ids {
            self.send_to_connection(*connection_id, message).await;
        }
    }

    async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_reaches_registered_connection() {
        let manager = InMemoryConnectionManager::new();
        let id = ConnectionId::new();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        manager.add_connection(id, sender).await;

        assert!(manager.send_to_connection(id, "hello").await);
        assert_eq!(receiver.recv().await.as_deref(), Some("hello"));
        assert_eq!(manager.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_closed_connection_is_skipped() {
        let manager = InMemoryConnectionManager::new();
        let open = ConnectionId::new();
        let closed = ConnectionId::new();
        let (open_sender, mut open_receiver) = mpsc::unbounded_channel();
        let (closed_sender, closed_receiver) = mpsc::unbounded_channel();
        manager.add_connection(open, open_sender).await;
        manager.add_connection(closed, closed_sender).await;
        drop(closed_receiver);

        assert!(!manager.send_to_connection(closed, "ping").await);
        manager.send_to_connections(&[closed, open], "ping").await;

        assert_eq!(open_receiver.recv().await.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn test_removed_connection_receives_nothing() {
        let manager = InMemoryConnectionManager::new();
        let id = ConnectionId::new();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        manager.add_connection(id, sender).await;
        manager.remove_connection(id).await;

        assert!(!manager.send_to_connection(id, "late").await);
        assert_eq!(manager.connection_count().await, 0);
        // Manager dropped its sender, so the channel is closed and empty
        assert!(receiver.recv().await.is_none());
    }
}
