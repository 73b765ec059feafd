//! In-memory conversation state store backed by a concurrent map.

use dashmap::DashMap;
use std::sync::Arc;

use frontis_core::state::StateStore;
use frontis_types::dialog::ConversationState;
use frontis_types::domain::ConversationId;
use frontis_types::error::RepositoryError;

/// `StateStore` over a `DashMap`. Clones share the same map, so a
/// "restarted" engine over a clone sees the same conversations.
#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    states: Arc<DashMap<ConversationId, ConversationState>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryConversationStore {
    async fn load(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<ConversationState>, RepositoryError> {
        Ok(self.states.get(conversation).map(|s| s.clone()))
    }

    async fn save(
        &self,
        conversation: &ConversationId,
        state: &ConversationState,
    ) -> Result<(), RepositoryError> {
        self.states.insert(*conversation, state.clone());
        Ok(())
    }

    async fn clear(&self, conversation: &ConversationId) -> Result<(), RepositoryError> {
        self.states.remove(conversation);
        Ok(())
    }
}
