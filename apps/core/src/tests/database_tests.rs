//! Database Module Tests
//!
//! Session and conversation storage, against in-memory and on-disk SQLite.

use crate::database;
use crate::models::ConversationEntry;
use sqlx::sqlite::SqlitePool;
use tempfile::tempdir;

async fn create_test_pool() -> SqlitePool {
    database::init_db("sqlite::memory:")
        .await
        .expect("Failed to create test pool")
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_session() {
        let pool = create_test_pool().await;

        let session = database::create_session(&pool)
            .await
            .expect("Failed to create session");

        assert_eq!(session.id.len(), 36);
        assert!(session.created_at > 0);
    }

    #[tokio::test]
    async fn test_ensure_session_is_idempotent() {
        let pool = create_test_pool().await;

        let first = database::ensure_session(&pool, "session-a").await.unwrap();
        let second = database::ensure_session(&pool, "session-a").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let pool = create_test_pool().await;

        let session = database::get_session(&pool, "nope").await.unwrap();
        assert!(session.is_none());
    }
}

#[cfg(test)]
mod conversation_tests {
    use super::*;

    #[tokio::test]
    async fn test_exchange_is_stored_in_order() {
        let pool = create_test_pool().await;
        let session = database::create_session(&pool).await.unwrap();

        database::add_exchange(&pool, &session.id, "Morocco vs Mali", "Morocco 1 - 0 Mali | Status: Live - 65'")
            .await
            .unwrap();
        database::add_message(&pool, &session.id, &ConversationEntry::user("Who won?"))
            .await
            .unwrap();

        let conversation = database::get_conversation(&pool, &session.id).await.unwrap();
        assert_eq!(
            conversation,
            vec![
                ConversationEntry::user("Morocco vs Mali"),
                ConversationEntry::assistant("Morocco 1 - 0 Mali | Status: Live - 65'"),
                ConversationEntry::user("Who won?"),
            ]
        );
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let pool = create_test_pool().await;
        let a = database::create_session(&pool).await.unwrap();
        let b = database::create_session(&pool).await.unwrap();

        database::add_exchange(&pool, &a.id, "hello", "Please specify the teams").await.unwrap();

        assert_eq!(database::get_conversation(&pool, &a.id).await.unwrap().len(), 2);
        assert!(database::get_conversation(&pool, &b.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_conversation() {
        let pool = create_test_pool().await;
        let session = database::create_session(&pool).await.unwrap();
        database::add_exchange(&pool, &session.id, "q1", "a1").await.unwrap();
        database::add_exchange(&pool, &session.id, "q2", "a2").await.unwrap();

        let removed = database::clear_conversation(&pool, &session.id).await.unwrap();

        assert_eq!(removed, 4);
        assert!(database::get_conversation(&pool, &session.id).await.unwrap().is_empty());
        // The session itself survives.
        assert!(database::get_session(&pool, &session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite://{}", dir.path().join("matchday.sqlite").display());

        {
            let pool = database::init_db(&url).await.unwrap();
            database::ensure_session(&pool, "kept").await.unwrap();
            database::add_exchange(&pool, "kept", "q", "a").await.unwrap();
            pool.close().await;
        }

        let pool = database::init_db(&url).await.unwrap();
        assert_eq!(database::get_conversation(&pool, "kept").await.unwrap().len(), 2);
        database::ping(&pool).await.unwrap();
    }
}
