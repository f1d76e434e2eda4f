use crate::actors::messages::{AppError, SupervisorMessage};
use crate::actors::traits::{EngineProcessor, QueryProcessor};
use crate::brain::pipeline::QueryEngine;
use crate::brain::templates::{APOLOGY, EMPTY_MESSAGE};
use crate::database;
use crate::models::{ChatReply, ConversationEntry};
use crate::preflight::{self, PreflightReport};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A handle to the `SupervisorActor`.
///
/// This is the chat adapter: it owns the conversation store, hands user lines
/// to a [`QueryProcessor`] and records each exchange. Messages are handled one
/// at a time, so a session's log is never written concurrently.
#[derive(Clone)]
pub struct SupervisorHandle {
    sender: mpsc::Sender<SupervisorMessage>,
}

impl SupervisorHandle {
    /// Spawns a supervisor answering with `processor` and storing
    /// conversations in `pool`.
    pub fn new<P: QueryProcessor>(processor: Arc<P>, pool: SqlitePool) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = SupervisorRunner::new(receiver, processor, pool);
        tokio::spawn(async move { actor.run().await });
        Self { sender }
    }

    /// Spawns a supervisor over the query engine.
    pub fn with_engine(engine: Arc<QueryEngine>, pool: SqlitePool) -> Self {
        Self::new(Arc::new(EngineProcessor::new(engine)), pool)
    }

    /// Answers one user line.
    ///
    /// `session_id` of `None` opens a new session. The returned reply carries
    /// the session id to reuse for follow-up lines. An empty line is answered
    /// with a prompt and not recorded. A processing fault is answered with the
    /// generic apology and its detail in `error`.
    #[instrument(skip(self, message))]
    pub async fn chat(
        &self,
        session_id: Option<String>,
        message: String,
    ) -> Result<ChatReply, AppError> {
        self.request(|responder| SupervisorMessage::Chat {
            session_id,
            message,
            responder,
        })
        .await?
    }

    /// The conversation recorded for a session, oldest line first.
    #[instrument(skip(self))]
    pub async fn conversation(&self, session_id: String) -> Result<Vec<ConversationEntry>, AppError> {
        self.request(|responder| SupervisorMessage::Conversation {
            session_id,
            responder,
        })
        .await?
    }

    /// Forgets a session's conversation. Returns the number of lines removed.
    #[instrument(skip(self))]
    pub async fn clear(&self, session_id: String) -> Result<u64, AppError> {
        self.request(|responder| SupervisorMessage::Clear {
            session_id,
            responder,
        })
        .await?
    }

    /// Current health of the processor and the conversation store.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<PreflightReport, AppError> {
        self.request(|responder| SupervisorMessage::Health { responder })
            .await
    }

    /// Stops the supervisor. Later requests fail with `AppError::Actor`.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(SupervisorMessage::Shutdown)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SupervisorMessage,
    ) -> Result<T, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(build(send))
            .await
            .map_err(|e| AppError::Actor(e.to_string()))?;
        timeout(REQUEST_TIMEOUT, recv)
            .await?
            .map_err(|e| AppError::Actor(e.to_string()))
    }
}

/// The internal logic of the `SupervisorActor`.
///
/// Generic over the processor so tests can inject a mock.
pub struct SupervisorRunner<P: QueryProcessor> {
    receiver: mpsc::Receiver<SupervisorMessage>,
    processor: Arc<P>,
    pool: SqlitePool,
}

impl<P: QueryProcessor> SupervisorRunner<P> {
    pub fn new(
        receiver: mpsc::Receiver<SupervisorMessage>,
        processor: Arc<P>,
        pool: SqlitePool,
    ) -> Self {
        Self {
            receiver,
            processor,
            pool,
        }
    }

    /// The main event loop. Returns on `Shutdown` or when every handle is gone.
    pub async fn run(mut self) {
        info!("SupervisorActor started");
        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, SupervisorMessage::Shutdown) {
                info!("SupervisorActor shutdown requested");
                break;
            }
            self.handle_message(msg).await;
        }
        info!("SupervisorActor stopped");
    }

    #[instrument(skip(self, msg))]
    async fn handle_message(&self, msg: SupervisorMessage) {
        match msg {
            SupervisorMessage::Chat {
                session_id,
                message,
                responder,
            } => {
                let result = self.handle_chat(session_id, message).await;
                let _ = responder.send(result);
            }
            SupervisorMessage::Conversation {
                session_id,
                responder,
            } => {
                let result = database::get_conversation(&self.pool, &session_id)
                    .await
                    .map_err(AppError::from);
                let _ = responder.send(result);
            }
            SupervisorMessage::Clear {
                session_id,
                responder,
            } => {
                let result = database::clear_conversation(&self.pool, &session_id)
                    .await
                    .map_err(AppError::from);
                if let Ok(removed) = &result {
                    info!(session_id = %session_id, removed, "Conversation cleared");
                }
                let _ = responder.send(result);
            }
            SupervisorMessage::Health { responder } => {
                let mut checks = self.processor.self_check();
                checks.push(preflight::check_database(&self.pool).await);
                let _ = responder.send(PreflightReport::from_checks(checks));
            }
            SupervisorMessage::Shutdown => {}
        }
    }

    async fn handle_chat(
        &self,
        session_id: Option<String>,
        message: String,
    ) -> Result<ChatReply, AppError> {
        if message.trim().is_empty() {
            return Ok(ChatReply {
                session_id,
                response: EMPTY_MESSAGE.to_string(),
                conversation: Vec::new(),
                error: None,
            });
        }

        let session = match session_id {
            Some(id) => database::ensure_session(&self.pool, &id).await?,
            None => {
                let session = database::create_session(&self.pool).await?;
                info!(session_id = %session.id, "New session");
                session
            }
        };

        match self.processor.answer(message.clone()).await {
            Ok(response) => {
                database::add_exchange(&self.pool, &session.id, &message, &response).await?;
                let conversation = database::get_conversation(&self.pool, &session.id).await?;
                debug!(session_id = %session.id, lines = conversation.len(), "Exchange recorded");
                Ok(ChatReply {
                    session_id: Some(session.id),
                    response,
                    conversation,
                    error: None,
                })
            }
            Err(e) => {
                error!(session_id = %session.id, "Failed to answer message: {}", e);
                let conversation = database::get_conversation(&self.pool, &session.id)
                    .await
                    .unwrap_or_default();
                Ok(ChatReply {
                    session_id: Some(session.id),
                    response: APOLOGY.to_string(),
                    conversation,
                    error: Some(e.to_string()),
                })
            }
        }
    }
}
