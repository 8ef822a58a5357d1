//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use trivia_server::websockets::{ConnectionId, ServerMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    connections: Vec<ConnectionId>,
}

impl<'a> MessageAssertion<'a> {
    pub fn for_connection(setup: &'a TestSetup, connection_id: ConnectionId) -> Self {
        Self {
            setup,
            connections: vec![connection_id],
        }
    }

    pub fn for_connections(setup: &'a TestSetup, connections: Vec<ConnectionId>) -> Self {
        Self { setup, connections }
    }

    /// Assert that every connection's next message has the given type
    /// (consumes it) and that all of them carry the same payload
    pub async fn received(self, expected_type: &str) -> ServerMessage {
        let mut messages = vec![];

        for connection_id in &self.connections {
            let raw = self
                .setup
                .mock_conn_manager
                .consume_message_for(*connection_id)
                .await;
            assert!(
                raw.is_some(),
                "{} should have received {}",
                connection_id,
                expected_type
            );

            let message: ServerMessage = serde_json::from_str(&raw.unwrap()).unwrap();
            assert_eq!(
                message.message_type(),
                expected_type,
                "{} received wrong message type: {:?}",
                connection_id,
                message
            );
            messages.push(message);
        }

        for message in messages.iter().skip(1) {
            assert_eq!(message, &messages[0], "broadcast payloads differ");
        }

        messages.remove(0)
    }

    /// Assert that the next message is an `error` with the given text
    pub async fn received_error(self, expected: &str) {
        match self.received("error").await {
            ServerMessage::Error { message } => assert_eq!(message, expected),
            other => panic!("expected error, got {:?}", other),
        }
    }

    /// Assert a sequence of message types in order (consumes them)
    pub async fn received_sequence(self, expected_types: &[&str]) -> Vec<ServerMessage> {
        let mut result = vec![];
        for connection_id in &self.connections {
            for expected_type in expected_types {
                let assertion = MessageAssertion::for_connection(self.setup, *connection_id);
                result.push(assertion.received(expected_type).await);
            }
        }
        result
    }

    /// Assert that there is nothing left in any queue
    pub async fn received_no_messages(self) {
        for connection_id in &self.connections {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(*connection_id)
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                connection_id,
                messages
            );
        }
    }
}

/// Extract the expression from a `new-question` message
pub fn question_text(message: &ServerMessage) -> &str {
    match message {
        ServerMessage::NewQuestion { question } => question,
        other => panic!("expected new-question, got {:?}", other),
    }
}
