use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

use crate::room::models::{PlayerScore, RoomCode};

/// Messages sent by clients. The `type` field selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        difficulty: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_code: String,
        #[serde(default)]
        username: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    StartGame { room_code: String },
    #[serde(rename_all = "camelCase")]
    Answer {
        room_code: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        answer: Option<AnswerValue>,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn message_type(&self) -> &'static str {
        self.into()
    }
}

/// Submitted answer as it arrives on the wire. Numbers and strings can
/// match; any other JSON value is kept so it can be judged incorrect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl AnswerValue {
    /// Lenient integer reading: numbers are truncated toward zero, strings
    /// use their leading sign and digits ("42abc" reads as 42)
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AnswerValue::Integer(value) => Some(*value),
            AnswerValue::Float(value) => {
                let truncated = value.trunc();
                if truncated.is_finite()
                    && truncated >= i64::MIN as f64
                    && truncated <= i64::MAX as f64
                {
                    Some(truncated as i64)
                } else {
                    None
                }
            }
            AnswerValue::Text(text) => parse_leading_integer(text),
            AnswerValue::Other(_) => None,
        }
    }
}

fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    format!("{}{}", sign, &rest[..digits_len]).parse().ok()
}

/// Messages pushed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    RoomJoined { room_code: RoomCode },
    Error { message: String },
    PlayerJoined { players: Vec<PlayerScore> },
    PlayerLeft { players: Vec<PlayerScore> },
    NewQuestion { question: String },
    TimeUp,
    #[serde(rename_all = "camelCase")]
    CorrectAnswer {
        correct_player: String,
        leaderboard: Vec<PlayerScore>,
        points: u64,
    },
    IncorrectAnswer { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn incorrect_answer() -> Self {
        ServerMessage::IncorrectAnswer {
            message: "Wrong answer, try again!".to_string(),
        }
    }

    pub fn message_type(&self) -> &'static str {
        self.into()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
