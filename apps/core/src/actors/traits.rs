use crate::actors::messages::{ActorError, AppError};
use crate::brain::pipeline::QueryEngine;
use crate::preflight::{self, CheckResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Defines the public interface for whatever answers user questions.
///
/// The supervisor only sees this trait, so tests can swap in a scripted
/// processor and the engine can be replaced without touching the session layer.
#[async_trait]
pub trait QueryProcessor: Send + Sync + 'static {
    /// Produces the answer text for one user line.
    async fn answer(&self, text: String) -> Result<String, AppError>;

    /// Component checks contributed to the health report.
    fn self_check(&self) -> Vec<CheckResult>;
}

/// Runs the query engine on the blocking pool.
#[derive(Clone)]
pub struct EngineProcessor {
    engine: Arc<QueryEngine>,
}

impl EngineProcessor {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl QueryProcessor for EngineProcessor {
    async fn answer(&self, text: String) -> Result<String, AppError> {
        let engine = self.engine.clone();
        let response = tokio::task::spawn_blocking(move || engine.process_query(&text))
            .await
            .map_err(ActorError::from)?;
        Ok(response)
    }

    fn self_check(&self) -> Vec<CheckResult> {
        vec![
            preflight::check_dataset(self.engine.repository()),
            preflight::check_lexicon(&self.engine.lexicon().current()),
        ]
    }
}
