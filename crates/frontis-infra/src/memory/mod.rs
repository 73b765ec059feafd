//! In-memory collaborators for the demo mode and for tests.

pub mod domain;
pub mod state;

pub use domain::InMemoryDomainRepository;
pub use state::InMemoryConversationStore;
