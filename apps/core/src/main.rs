// Matchday entry point: a line-oriented chat loop over stdin.

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use matchday_core::actors::supervisor::SupervisorHandle;
use matchday_core::brain::pipeline::QueryEngine;
use matchday_core::config::Settings;
use matchday_core::{database, preflight, telemetry};

const HELP: &str = "Ask about a match, e.g. \"Morocco vs Mali\" or \"Quand joue le Sénégal ?\".\n\
Commands: /history, /clear, /health, /quit";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let settings = Settings::from_env().context("Failed to load settings")?;
    telemetry::init_tracing("matchday", settings.log_format)?;

    info!(dataset = %settings.dataset_path.display(), "Starting matchday");

    let pool = database::init_db(&settings.database_url)
        .await
        .context("Failed to initialize database")?;

    let report = preflight::run_preflight_checks(&settings, &pool).await;
    if !report.ready_to_start {
        anyhow::bail!("Preflight failed: {}", report.summary);
    }

    let engine = Arc::new(QueryEngine::from_settings(&settings)?);
    let supervisor = SupervisorHandle::with_engine(engine, pool);

    run_chat_loop(&supervisor).await?;

    if let Err(e) = supervisor.shutdown().await {
        warn!("Supervisor already stopped: {}", e);
    }
    Ok(())
}

async fn run_chat_loop(supervisor: &SupervisorHandle) -> Result<()> {
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut session_id: Option<String> = None;

    stdout.write_all(format!("{}\n", HELP).as_bytes()).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = line.trim().to_string();
        let output = match command.as_str() {
            "/quit" | "/exit" => break,
            "/help" => HELP.to_string(),
            "/history" => match &session_id {
                Some(id) => {
                    let conversation = supervisor.conversation(id.clone()).await?;
                    conversation
                        .iter()
                        .map(|entry| {
                            let speaker = if entry.is_user { "you" } else { "bot" };
                            format!("{}: {}", speaker, entry.message)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
                None => "No conversation yet.".to_string(),
            },
            "/clear" => match &session_id {
                Some(id) => {
                    supervisor.clear(id.clone()).await?;
                    "Conversation cleared".to_string()
                }
                None => "Conversation cleared".to_string(),
            },
            "/health" => {
                let report = supervisor.health().await?;
                serde_json::to_string_pretty(&report)?
            }
            _ => match supervisor.chat(session_id.clone(), line).await {
                Ok(reply) => {
                    if reply.session_id.is_some() {
                        session_id = reply.session_id;
                    }
                    if let Some(detail) = &reply.error {
                        error!("Request failed: {}", detail);
                    }
                    reply.response
                }
                Err(e) => {
                    error!("Chat request failed: {}", e);
                    matchday_core::brain::templates::APOLOGY.to_string()
                }
            },
        };

        stdout.write_all(format!("{}\n", output).as_bytes()).await?;
    }

    Ok(())
}
