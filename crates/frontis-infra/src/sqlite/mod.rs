//! SQLite-backed collaborators: split read/write pool, the domain
//! repository, and the conversation state store.

pub mod domain;
pub mod pool;
pub mod state;

pub use domain::SqliteDomainRepository;
pub use pool::DatabasePool;
pub use state::SqliteConversationStore;
