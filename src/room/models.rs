use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::game::QuestionTimer;
use crate::question::{Difficulty, Question};
use crate::websockets::ConnectionId;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Short, human-typeable room identifier. Always stored uppercase so lookups
/// are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub const LENGTH: usize = 5;

    /// Normalizes user input (trim + uppercase) into a lookup key
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..Self::LENGTH)
            .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A connection bound to a username within one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub username: String,
    pub score: u64,
}

impl Participant {
    pub fn new(connection_id: ConnectionId, username: String) -> Self {
        Self {
            connection_id,
            username,
            score: 0,
        }
    }
}

/// One leaderboard row, serialized as `{name, score}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub name: String,
    pub score: u64,
}

#[derive(Debug, Clone)]
pub struct ActiveQuestion {
    pub question: Question,
    pub issued_at: Instant,
    pub seq: u64,
}

impl ActiveQuestion {
    pub fn elapsed(&self) -> Duration {
        self.issued_at.elapsed()
    }
}

/// In-memory room state. Owned exclusively by the registry.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub difficulty: Difficulty,
    participants: Vec<Participant>,
    active_question: Option<ActiveQuestion>,
    question_seq: u64,
    timer: Option<QuestionTimer>,
}

impl Room {
    /// Creates a room with the host as its only participant
    pub fn new(code: RoomCode, difficulty: Difficulty, host: Participant) -> Self {
        Self {
            code,
            difficulty,
            participants: vec![host],
            active_question: None,
            question_seq: 0,
            timer: None,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.participants.iter().map(|p| p.connection_id).collect()
    }

    pub fn has_username(&self, username: &str) -> bool {
        self.participants.iter().any(|p| p.username == username)
    }

    pub fn has_connection(&self, connection_id: ConnectionId) -> bool {
        self.participant_for(connection_id).is_some()
    }

    pub fn participant_for(&self, connection_id: ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection_id == connection_id)
    }

    pub fn score_of(&self, username: &str) -> Option<u64> {
        self.participants
            .iter()
            .find(|p| p.username == username)
            .map(|p| p.score)
    }

    pub(crate) fn add_participant(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    /// Removes the participant bound to the connection, dropping its score
    pub(crate) fn remove_participant(&mut self, connection_id: ConnectionId) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| p.connection_id == connection_id)?;
        Some(self.participants.remove(index))
    }

    /// Scores descending; equal scores keep join order (the sort is stable)
    pub fn leaderboard(&self) -> Vec<PlayerScore> {
        let mut board: Vec<PlayerScore> = self
            .participants
            .iter()
            .map(|p| PlayerScore {
                name: p.username.clone(),
                score: p.score,
            })
            .collect();
        board.sort_by(|a, b| b.score.cmp(&a.score));
        board
    }

    pub fn active_question(&self) -> Option<&ActiveQuestion> {
        self.active_question.as_ref()
    }

    pub fn question_seq(&self) -> u64 {
        self.question_seq
    }

    /// Installs the next active question and returns its sequence number
    pub(crate) fn set_question(&mut self, question: Question, issued_at: Instant) -> u64 {
        self.question_seq += 1;
        self.active_question = Some(ActiveQuestion {
            question,
            issued_at,
            seq: self.question_seq,
        });
        self.question_seq
    }

    /// Adds points to the participant bound to the connection and returns
    /// their username
    pub(crate) fn award_points(&mut self, connection_id: ConnectionId, points: u64) -> Option<String> {
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.connection_id == connection_id)?;
        participant.score += points;
        Some(participant.username.clone())
    }

    /// Stores the timer for the current question. A previous timer is
    /// dropped, which aborts it.
    pub(crate) fn arm_timer(&mut self, timer: QuestionTimer) {
        self.timer = Some(timer);
    }

    pub(crate) fn take_timer(&mut self) -> Option<QuestionTimer> {
        self.timer.take()
    }

    /// Cancels the pending timer, if any. Returns whether one was pending.
    pub(crate) fn cancel_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }
}
