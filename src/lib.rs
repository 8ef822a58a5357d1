// Library crate for the trivia game server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod question;
pub mod room;
pub mod server;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use game::{GameError, GameService, GameSettings};
pub use room::{RoomCode, RoomRegistry};
pub use server::build_router;
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientMessage, ConnectionId, ConnectionManager, MessageHandler, ServerMessage,
    WebsocketReceiveHandler,
};
