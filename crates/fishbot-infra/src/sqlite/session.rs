//! SQLite session store implementation.
//!
//! Implements `SessionStore` from `fishbot-core` using sqlx with split
//! read/write pools. One row per chat id; the dialogue state is stored
//! by its label and parsed back on load.

use chrono::Utc;
use sqlx::Row;

use fishbot_core::store::SessionStore;
use fishbot_types::error::StoreError;
use fishbot_types::ids::{ChatId, ProductId};
use fishbot_types::session::Session;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new session store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    chat_id: i64,
    state: String,
    selected_product_id: Option<String>,
    selected_product_name: Option<String>,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            state: row.try_get("state")?,
            selected_product_id: row.try_get("selected_product_id")?,
            selected_product_name: row.try_get("selected_product_name")?,
        })
    }

    fn into_session(self) -> Result<Session, StoreError> {
        // A label that no longer parses means the record is corrupt; the
        // turn aborts and the record stays as it is.
        let state = self
            .state
            .parse()
            .map_err(|e: String| StoreError::Query(e))?;
        Ok(Session {
            chat_id: ChatId(self.chat_id),
            state,
            selected_product_id: self.selected_product_id.map(ProductId::from),
            selected_product_name: self.selected_product_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteSessionStore {
    async fn load(&self, chat: ChatId) -> Result<Session, StoreError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE chat_id = ?")
            .bind(chat.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let session_row = SessionRow::from_row(&row).map_err(map_sqlx)?;
                session_row.into_session()
            }
            None => Ok(Session::new(chat)),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO sessions (chat_id, state, selected_product_id, selected_product_name, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (chat_id) DO UPDATE SET
                   state = excluded.state,
                   selected_product_id = excluded.selected_product_id,
                   selected_product_name = excluded.selected_product_name,
                   updated_at = excluded.updated_at"#,
        )
        .bind(session.chat_id.0)
        .bind(session.state.to_string())
        .bind(session.selected_product_id.as_ref().map(|id| id.as_str()))
        .bind(session.selected_product_name.as_deref())
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbot_types::session::DialogueState;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_unknown_chat_returns_start_session() {
        let store = SqliteSessionStore::new(test_pool().await);

        let session = store.load(ChatId(7)).await.unwrap();
        assert_eq!(session.chat_id, ChatId(7));
        assert_eq!(session.state, DialogueState::Start);
        assert!(session.selected_product_id.is_none());
        assert!(session.selected_product_name.is_none());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip_with_selection() {
        let store = SqliteSessionStore::new(test_pool().await);

        let session = Session::new(ChatId(7))
            .with_selection(ProductId::from("fish-1"), "Salmon".to_string());
        store.save(&session).await.unwrap();

        let loaded = store.load(ChatId(7)).await.unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_save_upserts_full_record() {
        let store = SqliteSessionStore::new(test_pool().await);

        let selected = Session::new(ChatId(7))
            .with_selection(ProductId::from("fish-1"), "Salmon".to_string());
        store.save(&selected).await.unwrap();

        // Moving back to the menu clears the selection columns too.
        let back = selected.with_state(DialogueState::Menu);
        store.save(&back).await.unwrap();

        let loaded = store.load(ChatId(7)).await.unwrap();
        assert_eq!(loaded.state, DialogueState::Menu);
        assert!(loaded.selected_product_id.is_none());
        assert!(loaded.selected_product_name.is_none());
    }

    #[tokio::test]
    async fn test_chats_do_not_share_sessions() {
        let store = SqliteSessionStore::new(test_pool().await);

        store
            .save(&Session::new(ChatId(1)).with_state(DialogueState::Cart))
            .await
            .unwrap();
        store
            .save(&Session::new(ChatId(2)).with_state(DialogueState::Menu))
            .await
            .unwrap();

        assert_eq!(
            store.load(ChatId(1)).await.unwrap().state,
            DialogueState::Cart
        );
        assert_eq!(
            store.load(ChatId(2)).await.unwrap().state,
            DialogueState::Menu
        );
    }

    #[tokio::test]
    async fn test_corrupted_state_label_is_a_query_error() {
        let pool = test_pool().await;
        let store = SqliteSessionStore::new(pool.clone());

        sqlx::query(
            "INSERT INTO sessions (chat_id, state, updated_at) VALUES (?, ?, ?)",
        )
        .bind(7i64)
        .bind("HANDLE_MENU")
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();

        let err = store.load(ChatId(7)).await.unwrap_err();
        match err {
            StoreError::Query(message) => assert!(message.contains("HANDLE_MENU")),
            other => panic!("expected Query error, got {other:?}"),
        }
    }
}
