//! Per-conversation state persistence.

pub mod store;

pub use store::StateStore;
