//! Observability for Frontis.

pub mod tracing_setup;
