use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Lifecycle stage of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Scheduled,
    Live,
    Finished,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Scheduled => "scheduled",
            Status::Live => "live",
            Status::Finished => "finished",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single match snapshot as stored in the dataset.
///
/// `score1`/`score2` are only meaningful while the match is live or finished.
/// `time` holds the kickoff timestamp for scheduled matches and the running
/// clock for live ones; it is ignored once the match is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub team1: String,
    pub team2: String,
    #[serde(default)]
    pub score1: Option<u32>,
    #[serde(default)]
    pub score2: Option<u32>,
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time: String,
}

impl MatchRecord {
    /// Whether `team` plays on either side of this match.
    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    /// Whether this match opposes `a` and `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.team1 == a && self.team2 == b) || (self.team1 == b && self.team2 == a)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Represents a chat session (one conversation log).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// The unique identifier for the session (UUID).
    pub id: String,
    /// Unix timestamp of when the session was created.
    pub created_at: i64,
}

/// One line of a conversation, as returned to the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConversationEntry {
    /// The text of the message.
    pub message: String,
    /// `true` for the user's line, `false` for the assistant's answer.
    #[serde(rename = "isUser")]
    pub is_user: bool,
}

impl ConversationEntry {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_user: true,
        }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_user: false,
        }
    }
}

/// Reply produced by the chat adapter for one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The session the message was recorded in. Empty messages are not
    /// recorded, so they may come back without one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_id: Option<String>,
    /// Final answer text.
    pub response: String,
    /// The whole conversation after this exchange.
    #[serde(default)]
    pub conversation: Vec<ConversationEntry>,
    /// Diagnostic detail, only present when the request failed internally.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}
