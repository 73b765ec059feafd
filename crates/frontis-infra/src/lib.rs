//! Infrastructure implementations for the Frontis dialog engine.
//!
//! The core crate defines the collaborator traits (`DomainRepository`,
//! `StateStore`); this crate provides the SQLite-backed implementations
//! used in production and the in-memory ones used by the demo mode and
//! by tests.

pub mod config;
pub mod memory;
pub mod sqlite;
