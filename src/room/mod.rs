// Public API
pub use models::{Participant, PlayerScore, Room, RoomCode};
pub use repository::{JoinRoomResult, LeaveRoomResult, RoomRegistry};

// Internal modules
pub mod models;
pub mod repository;
