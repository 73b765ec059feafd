//! SQLite conversation state store.
//!
//! Implements `StateStore` from `frontis-core` with one JSON document
//! per conversation, upserted in a single statement so a turn's write
//! is atomic.

use chrono::Utc;
use sqlx::Row;

use frontis_core::state::StateStore;
use frontis_types::dialog::ConversationState;
use frontis_types::domain::ConversationId;
use frontis_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `StateStore`.
pub struct SqliteConversationStore {
    pool: DatabasePool,
}

impl SqliteConversationStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl StateStore for SqliteConversationStore {
    async fn load(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<ConversationState>, RepositoryError> {
        let row = sqlx::query("SELECT state FROM conversation_state WHERE conversation_id = ?")
            .bind(conversation.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let state_str: String = row
                    .try_get("state")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let state: ConversationState = serde_json::from_str(&state_str)
                    .map_err(|e| RepositoryError::Query(format!("invalid state JSON: {e}")))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        conversation: &ConversationId,
        state: &ConversationState,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let state_str = serde_json::to_string(state)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize state: {e}")))?;

        sqlx::query(
            r#"INSERT INTO conversation_state (conversation_id, state, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (conversation_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at"#,
        )
        .bind(conversation.to_string())
        .bind(&state_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self, conversation: &ConversationId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM conversation_state WHERE conversation_id = ?")
            .bind(conversation.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
