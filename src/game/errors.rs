use thiserror::Error;

/// Recoverable protocol errors. Each one is reported to the originating
/// connection only, as an `error` message carrying the `Display` text.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Room does not exist!")]
    RoomNotFound { room_code: String },

    #[error("Username already taken in this room!")]
    UsernameTaken { username: String },

    #[error("No active question!")]
    NoActiveQuestion,

    #[error("You are not in this room!")]
    NotInRoom { room_code: String },

    #[error("Invalid message: {0}")]
    MalformedMessage(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Room {0} already exists")]
    RoomAlreadyExists(String),

    #[error("Could not allocate a room code, please try again")]
    RoomCodesExhausted,

    #[error("Failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        GameError::MalformedMessage(reason.into())
    }
}
