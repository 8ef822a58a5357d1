use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::{
    errors::GameError,
    scoring::points_for_answer,
    timer::QuestionTimer,
    usernames::{resolve_username, PetNameUsernameGenerator, UsernameGenerator},
};
use crate::question::{generate_question, Difficulty, Question};
use crate::room::{
    models::{PlayerScore, Room, RoomCode},
    repository::{JoinRoomResult, LeaveRoomResult, RoomRegistry},
};
use crate::websockets::{
    AnswerValue, ClientMessage, ConnectionId, ConnectionManager, MessageBroadcaster, ServerMessage,
};

#[derive(Debug, Clone)]
pub struct GameSettings {
    /// Time a question stays open before it is rotated
    pub question_budget: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            question_budget: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { username: String, points: u64 },
    Incorrect,
}

/// Read-only view of a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub difficulty: Difficulty,
    pub players: Vec<PlayerScore>,
    pub question: Option<Question>,
    pub question_seq: u64,
    pub has_pending_timer: bool,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.clone(),
            difficulty: room.difficulty,
            players: room.leaderboard(),
            question: room.active_question().map(|active| active.question.clone()),
            question_seq: room.question_seq(),
            has_pending_timer: room.has_pending_timer(),
        }
    }
}

/// Protocol state machine for every room.
///
/// Each transition (an inbound message, a disconnect or a timer firing) holds
/// the registry lock from start to finish, including queuing its outbound
/// messages, so transitions never interleave.
#[derive(Clone)]
pub struct GameService {
    registry: Arc<Mutex<RoomRegistry>>,
    connection_manager: Arc<dyn ConnectionManager>,
    usernames: Arc<dyn UsernameGenerator>,
    settings: GameSettings,
}

impl GameService {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, settings: GameSettings) -> Self {
        Self {
            registry: Arc::new(Mutex::new(RoomRegistry::new())),
            connection_manager,
            usernames: Arc::new(PetNameUsernameGenerator::new()),
            settings,
        }
    }

    pub fn with_username_generator(mut self, usernames: Arc<dyn UsernameGenerator>) -> Self {
        self.usernames = usernames;
        self
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Routes a parsed client message to its operation
    pub async fn handle_client_message(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), GameError> {
        match message {
            ClientMessage::CreateRoom {
                username,
                difficulty,
            } => self
                .create_room(connection_id, username.as_deref(), difficulty.as_deref())
                .await
                .map(|_| ()),
            ClientMessage::JoinRoom {
                room_code,
                username,
            } => {
                self.join_room(connection_id, &room_code, username.as_deref())
                    .await
            }
            ClientMessage::StartGame { room_code } => self.start_game(&room_code).await,
            ClientMessage::Answer {
                room_code,
                username,
                answer,
            } => self
                .submit_answer(connection_id, &room_code, username.as_deref(), answer.as_ref())
                .await
                .map(|_| ()),
        }
    }

    /// Reports a rejected request to the connection that sent it
    pub async fn send_error(&self, connection_id: ConnectionId, error: &GameError) {
        let reply = ServerMessage::error(error.to_string());
        if let Err(e) =
            MessageBroadcaster::send_to_connection(&self.connection_manager, connection_id, &reply)
                .await
        {
            warn!(connection_id = %connection_id, error = %e, "Failed to send error reply");
        }
    }

    #[instrument(skip(self))]
    pub async fn create_room(
        &self,
        connection_id: ConnectionId,
        username: Option<&str>,
        difficulty: Option<&str>,
    ) -> Result<RoomCode, GameError> {
        let username = resolve_username(username, self.usernames.as_ref())?;
        let difficulty = Difficulty::from_request(difficulty);

        let mut registry = self.registry.lock().await;
        let room_code =
            registry.create_room(connection_id, username.clone(), difficulty, &mut rand::rng())?;

        MessageBroadcaster::send_to_connection(
            &self.connection_manager,
            connection_id,
            &ServerMessage::RoomJoined {
                room_code: room_code.clone(),
            },
        )
        .await?;

        info!(
            room_code = %room_code,
            username = %username,
            %difficulty,
            "Room created by player"
        );

        Ok(room_code)
    }

    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        connection_id: ConnectionId,
        room_code: &str,
        username: Option<&str>,
    ) -> Result<(), GameError> {
        let room_code = RoomCode::normalize(room_code);
        let username = resolve_username(username, self.usernames.as_ref())?;

        let mut registry = self.registry.lock().await;
        let players = match registry.join_room(&room_code, &username, connection_id) {
            JoinRoomResult::Success(players) => players,
            JoinRoomResult::RoomNotFound => {
                return Err(GameError::RoomNotFound {
                    room_code: room_code.to_string(),
                })
            }
            JoinRoomResult::UsernameTaken => return Err(GameError::UsernameTaken { username }),
        };

        MessageBroadcaster::send_to_connection(
            &self.connection_manager,
            connection_id,
            &ServerMessage::RoomJoined {
                room_code: room_code.clone(),
            },
        )
        .await?;

        if let Some(room) = registry.get(&room_code) {
            MessageBroadcaster::broadcast_to_room(
                &self.connection_manager,
                room,
                &ServerMessage::PlayerJoined { players },
            )
            .await?;
        }

        Ok(())
    }

    /// Issues a fresh question to the room and arms its timer. Starting a room
    /// that already has a question replaces it.
    pub async fn start_game(&self, room_code: &str) -> Result<(), GameError> {
        self.begin_round(room_code, None).await
    }

    /// Like [`GameService::start_game`] with a predetermined first question
    pub async fn start_game_with_question(
        &self,
        room_code: &str,
        question: Question,
    ) -> Result<(), GameError> {
        self.begin_round(room_code, Some(question)).await
    }

    #[instrument(skip(self))]
    async fn begin_round(&self, room_code: &str, question: Option<Question>) -> Result<(), GameError> {
        let room_code = RoomCode::normalize(room_code);

        let mut registry = self.registry.lock().await;
        let room = registry
            .get_mut(&room_code)
            .ok_or_else(|| GameError::RoomNotFound {
                room_code: room_code.to_string(),
            })?;

        room.cancel_timer();
        let question = match question {
            Some(question) => question,
            None => generate_question(room.difficulty, &mut rand::rng()),
        };
        self.issue_question(room, question).await?;

        info!(room_code = %room_code, "Game started in room");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn submit_answer(
        &self,
        connection_id: ConnectionId,
        room_code: &str,
        claimed_username: Option<&str>,
        answer: Option<&AnswerValue>,
    ) -> Result<AnswerOutcome, GameError> {
        let room_code = RoomCode::normalize(room_code);

        let mut registry = self.registry.lock().await;
        let room = registry
            .get_mut(&room_code)
            .ok_or(GameError::NoActiveQuestion)?;

        let (is_correct, elapsed) = match room.active_question() {
            Some(active) => {
                let submitted = answer.and_then(AnswerValue::as_integer);
                (
                    submitted.is_some_and(|value| active.question.is_correct(value)),
                    active.elapsed(),
                )
            }
            None => return Err(GameError::NoActiveQuestion),
        };

        let username = match room.participant_for(connection_id) {
            Some(participant) => participant.username.clone(),
            None => {
                return Err(GameError::NotInRoom {
                    room_code: room_code.to_string(),
                })
            }
        };
        if let Some(claimed) = claimed_username {
            if claimed != username {
                debug!(
                    room_code = %room_code,
                    claimed = %claimed,
                    username = %username,
                    "Answer username differs from connection, crediting connection"
                );
            }
        }

        if !is_correct {
            debug!(room_code = %room_code, username = %username, "Incorrect answer");
            MessageBroadcaster::send_to_connection(
                &self.connection_manager,
                connection_id,
                &ServerMessage::incorrect_answer(),
            )
            .await?;
            return Ok(AnswerOutcome::Incorrect);
        }

        let points = points_for_answer(self.settings.question_budget, elapsed);
        room.cancel_timer();
        room.award_points(connection_id, points);

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            room,
            &ServerMessage::CorrectAnswer {
                correct_player: username.clone(),
                leaderboard: room.leaderboard(),
                points,
            },
        )
        .await?;

        let next = generate_question(room.difficulty, &mut rand::rng());
        self.issue_question(room, next).await?;

        info!(
            room_code = %room_code,
            username = %username,
            points,
            "Player answered correctly"
        );

        Ok(AnswerOutcome::Correct { username, points })
    }

    /// Removes the connection from every room it is in, notifying the players
    /// left behind. Rooms that become empty are deleted.
    #[instrument(skip(self))]
    pub async fn handle_disconnect(
        &self,
        connection_id: ConnectionId,
    ) -> Vec<(RoomCode, LeaveRoomResult)> {
        let mut registry = self.registry.lock().await;
        let results = registry.remove_connection(connection_id);

        for (room_code, result) in &results {
            if let LeaveRoomResult::Success { username } = result {
                let Some(room) = registry.get(room_code) else {
                    continue;
                };
                let message = ServerMessage::PlayerLeft {
                    players: room.leaderboard(),
                };
                if let Err(e) =
                    MessageBroadcaster::broadcast_to_room(&self.connection_manager, room, &message)
                        .await
                {
                    warn!(
                        room_code = %room_code,
                        username = %username,
                        error = %e,
                        "Failed to broadcast player departure"
                    );
                }
            }
        }

        results
    }

    /// Timer callback. A no-op when the room is gone or has moved past the
    /// question the timer was armed for.
    async fn expire_question(&self, room_code: &RoomCode, question_seq: u64) {
        let mut registry = self.registry.lock().await;
        let Some(room) = registry.get_mut(room_code) else {
            debug!(room_code = %room_code, "Question timer fired for a deleted room");
            return;
        };
        if room.question_seq() != question_seq {
            debug!(
                room_code = %room_code,
                question_seq,
                current_seq = room.question_seq(),
                "Stale question timer ignored"
            );
            return;
        }

        if let Some(timer) = room.take_timer() {
            timer.disarm();
        }

        info!(room_code = %room_code, question_seq, "Question timed out");

        if let Err(e) = self.rotate_expired_question(room).await {
            warn!(room_code = %room_code, error = %e, "Failed to rotate expired question");
        }
    }

    async fn rotate_expired_question(&self, room: &mut Room) -> Result<(), GameError> {
        MessageBroadcaster::broadcast_to_room(&self.connection_manager, room, &ServerMessage::TimeUp)
            .await?;
        let next = generate_question(room.difficulty, &mut rand::rng());
        self.issue_question(room, next).await
    }

    /// Makes `question` the room's active question, arms its timer and
    /// broadcasts it
    async fn issue_question(&self, room: &mut Room, question: Question) -> Result<(), GameError> {
        let expression = question.expression();
        let question_seq = room.set_question(question, Instant::now());
        room.arm_timer(self.arm_question_timer(room.code.clone(), question_seq));

        debug!(
            room_code = %room.code,
            question_seq,
            question = %expression,
            "Issued question"
        );

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            room,
            &ServerMessage::NewQuestion {
                question: expression,
            },
        )
        .await
    }

    fn arm_question_timer(&self, room_code: RoomCode, question_seq: u64) -> QuestionTimer {
        let service = self.clone();
        let budget = self.settings.question_budget;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            service.expire_question(&room_code, question_seq).await;
        });
        QuestionTimer::new(question_seq, handle)
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    pub async fn room_snapshot(&self, room_code: &str) -> Option<RoomSnapshot> {
        let registry = self.registry.lock().await;
        registry
            .get(&RoomCode::normalize(room_code))
            .map(RoomSnapshot::from)
    }

    pub async fn leaderboard(&self, room_code: &str) -> Option<Vec<PlayerScore>> {
        let registry = self.registry.lock().await;
        registry.leaderboard(&RoomCode::normalize(room_code))
    }
}
