use serde::Serialize;
use tokio::sync::oneshot;

use crate::models::{ChatReply, ConversationEntry};
use crate::preflight::PreflightReport;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// The query processor failed to produce an answer.
    #[error("Query processing failed: {0}")]
    Processing(String),
}

impl From<tokio::task::JoinError> for ActorError {
    fn from(err: tokio::task::JoinError) -> Self {
        ActorError::Processing(format!("Query worker stopped: {}", err))
    }
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the `SupervisorActor`.
#[derive(Debug)]
pub enum SupervisorMessage {
    /// A user line for a session. `None` opens a new session.
    Chat {
        session_id: Option<String>,
        message: String,
        /// A channel to send the reply (answer plus conversation) back.
        responder: oneshot::Sender<Result<ChatReply, AppError>>,
    },
    /// A request for a session's conversation so far.
    Conversation {
        session_id: String,
        responder: oneshot::Sender<Result<Vec<ConversationEntry>, AppError>>,
    },
    /// A request to forget a session's conversation.
    Clear {
        session_id: String,
        /// Number of lines removed.
        responder: oneshot::Sender<Result<u64, AppError>>,
    },
    /// A request for the current health report.
    Health {
        responder: oneshot::Sender<PreflightReport>,
    },
    /// A command to shut down the supervisor.
    Shutdown,
}
