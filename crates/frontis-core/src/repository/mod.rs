//! Repository trait definitions for the external persistence collaborator.

pub mod domain;

pub use domain::DomainRepository;
