//! Shared types for the Frontis homework dialog engine.
//!
//! This crate holds the data model that crosses crate boundaries:
//! read-only domain records fetched from the persistence collaborator,
//! the serializable dialog state (frames, property bag, prompts), the
//! outbound message variants handed to the transport, and the shared
//! error enums. No business logic lives here.

pub mod config;
pub mod dialog;
pub mod domain;
pub mod error;
pub mod message;
pub mod prompt;
