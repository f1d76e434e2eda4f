//! Conversation store.
//!
//! One row per session and one row per conversation line. The default URL is
//! an in-memory SQLite database, so the log lives as long as the process.

use crate::models::{ConversationEntry, Session};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    message TEXT NOT NULL,
    is_user BOOLEAN NOT NULL,
    created_at INTEGER NOT NULL,
    FOREIGN KEY(session_id) REFERENCES sessions(id)
);
CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, id);
"#;

pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    info!("Initializing database at: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // An in-memory database is private to its connection: keep exactly one,
    // never recycled.
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;

    sqlx::raw_sql(SCHEMA).execute(&pool).await?;

    info!("Database initialized and schema applied.");

    Ok(pool)
}

// --- Sessions ---

pub async fn create_session(pool: &SqlitePool) -> Result<Session, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    ensure_session(pool, &id).await
}

/// Returns the session with `id`, creating it first if needed.
pub async fn ensure_session(pool: &SqlitePool, id: &str) -> Result<Session, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO sessions (id, created_at) VALUES (?, ?)")
        .bind(id)
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;

    sqlx::query_as::<_, Session>("SELECT id, created_at FROM sessions WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_session(pool: &SqlitePool, id: &str) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>("SELECT id, created_at FROM sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

// --- Conversation ---

pub async fn add_message(
    pool: &SqlitePool,
    session_id: &str,
    entry: &ConversationEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO messages (session_id, message, is_user, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(session_id)
    .bind(&entry.message)
    .bind(entry.is_user)
    .bind(Utc::now().timestamp())
    .execute(pool)
    .await?;
    Ok(())
}

/// Appends a user line and its answer atomically.
pub async fn add_exchange(
    pool: &SqlitePool,
    session_id: &str,
    user_message: &str,
    response: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    for (message, is_user) in [(user_message, true), (response, false)] {
        sqlx::query(
            "INSERT INTO messages (session_id, message, is_user, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(message)
        .bind(is_user)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!(session_id, "Exchange stored");
    Ok(())
}

/// Conversation lines in insertion order.
pub async fn get_conversation(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Vec<ConversationEntry>, sqlx::Error> {
    sqlx::query_as::<_, ConversationEntry>(
        "SELECT message, is_user FROM messages WHERE session_id = ? ORDER BY id ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}

/// Removes every line of a session's conversation; returns how many.
pub async fn clear_conversation(pool: &SqlitePool, session_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE session_id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Cheap liveness probe.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
