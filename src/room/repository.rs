use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::models::{Participant, PlayerScore, Room, RoomCode};
use crate::game::GameError;
use crate::question::Difficulty;
use crate::websockets::ConnectionId;

/// Upper bound on code draws before creation gives up. With 36^5 codes this
/// is only reached when the registry is close to full.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Result of attempting to join a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinRoomResult {
    /// Joined the room, returns the updated leaderboard
    Success(Vec<PlayerScore>),
    /// Room does not exist
    RoomNotFound,
    /// Another participant in the room already uses the name
    UsernameTaken,
}

/// Result of removing a participant from a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveRoomResult {
    /// Participant removed, other players remain
    Success { username: String },
    /// Participant removed and the room was deleted because it is now empty
    RoomDeleted { username: String },
    /// Connection is not a participant of the room
    PlayerNotInRoom,
    /// Room does not exist
    RoomNotFound,
}

/// Owner of every live room, keyed by normalized room code
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Creates a room under a fresh code with the creator as sole participant.
    /// Occupied codes are redrawn instead of overwriting the existing room.
    #[instrument(skip(self, rng))]
    pub fn create_room<R: Rng + ?Sized>(
        &mut self,
        connection_id: ConnectionId,
        username: String,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<RoomCode, GameError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = RoomCode::generate(rng);
            if self.rooms.contains_key(&code) {
                warn!(room_code = %code, attempt, "Room code collision, regenerating");
                continue;
            }

            let room = Room::new(
                code.clone(),
                difficulty,
                Participant::new(connection_id, username),
            );
            self.insert_room(room)?;

            info!(room_code = %code, %difficulty, "Room created");
            return Ok(code);
        }

        warn!(attempts = MAX_CODE_ATTEMPTS, "Gave up allocating a room code");
        Err(GameError::RoomCodesExhausted)
    }

    /// Inserts a fully built room, refusing to replace an existing one
    pub fn insert_room(&mut self, room: Room) -> Result<(), GameError> {
        if self.rooms.contains_key(&room.code) {
            warn!(room_code = %room.code, "Room already exists");
            return Err(GameError::RoomAlreadyExists(room.code.to_string()));
        }
        self.rooms.insert(room.code.clone(), room);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn join_room(
        &mut self,
        room_code: &RoomCode,
        username: &str,
        connection_id: ConnectionId,
    ) -> JoinRoomResult {
        let room = match self.rooms.get_mut(room_code) {
            Some(room) => room,
            None => {
                debug!(room_code = %room_code, "Room not found");
                return JoinRoomResult::RoomNotFound;
            }
        };

        if room.has_username(username) {
            debug!(room_code = %room_code, username = %username, "Username already taken");
            return JoinRoomResult::UsernameTaken;
        }

        room.add_participant(Participant::new(connection_id, username.to_string()));

        info!(
            room_code = %room_code,
            username = %username,
            player_count = room.participant_count(),
            "Player joined room"
        );

        JoinRoomResult::Success(room.leaderboard())
    }

    /// Removes the participant bound to the connection. Deleting the room
    /// when it empties also cancels its pending question timer.
    #[instrument(skip(self))]
    pub fn remove_participant(
        &mut self,
        room_code: &RoomCode,
        connection_id: ConnectionId,
    ) -> LeaveRoomResult {
        let room = match self.rooms.get_mut(room_code) {
            Some(room) => room,
            None => return LeaveRoomResult::RoomNotFound,
        };

        let participant = match room.remove_participant(connection_id) {
            Some(participant) => participant,
            None => return LeaveRoomResult::PlayerNotInRoom,
        };

        info!(room_code = %room_code, username = %participant.username, "Player left room");

        if room.is_empty() {
            let had_timer = room.cancel_timer();
            self.rooms.remove(room_code);
            info!(room_code = %room_code, had_timer, "Room is empty and removed");
            return LeaveRoomResult::RoomDeleted {
                username: participant.username,
            };
        }

        LeaveRoomResult::Success {
            username: participant.username,
        }
    }

    /// Removes the connection from every room it participates in
    pub fn remove_connection(
        &mut self,
        connection_id: ConnectionId,
    ) -> Vec<(RoomCode, LeaveRoomResult)> {
        let mut codes: Vec<RoomCode> = self
            .rooms
            .values()
            .filter(|room| room.has_connection(connection_id))
            .map(|room| room.code.clone())
            .collect();
        codes.sort();

        codes
            .into_iter()
            .map(|code| {
                let result = self.remove_participant(&code, connection_id);
                (code, result)
            })
            .collect()
    }

    pub fn leaderboard(&self, room_code: &RoomCode) -> Option<Vec<PlayerScore>> {
        self.rooms.get(room_code).map(Room::leaderboard)
    }

    pub fn get(&self, room_code: &RoomCode) -> Option<&Room> {
        self.rooms.get(room_code)
    }

    pub fn get_mut(&mut self, room_code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(room_code)
    }

    pub fn contains(&self, room_code: &RoomCode) -> bool {
        self.rooms.contains_key(room_code)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
