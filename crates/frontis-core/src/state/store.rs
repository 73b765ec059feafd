//! State store trait definition.
//!
//! One conversation owns one `ConversationState` document. The engine
//! reads it once at turn start and writes it once at turn end; a turn
//! that aborts leaves the previously persisted document valid for the
//! next turn. Implementations live in frontis-infra.

use frontis_types::dialog::ConversationState;
use frontis_types::domain::ConversationId;
use frontis_types::error::RepositoryError;

/// Trait for per-conversation state persistence.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait StateStore: Send + Sync {
    /// Load the state document. Returns None for a conversation that has
    /// never been saved.
    fn load(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Option<ConversationState>, RepositoryError>> + Send;

    /// Persist the state document (upsert).
    fn save(
        &self,
        conversation: &ConversationId,
        state: &ConversationState,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Drop the state document. No-op if it does not exist.
    fn clear(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
