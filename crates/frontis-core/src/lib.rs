//! Core dialog engine for the Frontis homework bot.
//!
//! The engine is a stack-based, resumable, multi-turn interpreter: each
//! inbound message is one discrete unit of work, dialogs are ordered
//! lists of waterfall steps, and the complete resumable state (frames,
//! step indices, pending prompts, persisted properties) is externalized
//! to the state store at the end of every turn.
//!
//! Collaborator traits (`DomainRepository`, `StateStore`) use native
//! async fn in traits (RPITIT); implementations live in frontis-infra.

pub mod clock;
pub mod dialog;
pub mod engine;
pub mod flows;
pub mod query;
pub mod repository;
pub mod state;
