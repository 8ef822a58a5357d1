use std::sync::Arc;
use std::time::Duration;

use trivia_server::{
    game::{GameService, GameSettings},
    websockets::{ConnectionId, ConnectionManager, WebsocketReceiveHandler},
};

use super::mocks::{FixedUsernameGenerator, MockConnectionManager};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const GUEST_NAME: &str = "guest-player";

pub struct TestSetup {
    pub game_service: GameService,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
}

pub struct TestSetupBuilder {
    question_budget: Duration,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            question_budget: Duration::from_secs(20),
        }
    }

    #[allow(dead_code)]
    pub fn with_question_budget(mut self, question_budget: Duration) -> Self {
        self.question_budget = question_budget;
        self
    }

    pub fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let connection_manager: Arc<dyn ConnectionManager> = mock_conn_manager.clone();

        let game_service = GameService::new(
            connection_manager,
            GameSettings {
                question_budget: self.question_budget,
            },
        )
        .with_username_generator(Arc::new(FixedUsernameGenerator(GUEST_NAME)));

        let input_handler = WebsocketReceiveHandler::new(game_service.clone());

        TestSetup {
            game_service,
            mock_conn_manager,
            input_handler,
        }
    }
}

impl TestSetup {
    /// Registers a new client connection with the mock transport
    pub async fn connect(&self) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.mock_conn_manager.add_connected(connection_id).await;
        connection_id
    }
}
