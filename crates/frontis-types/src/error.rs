use thiserror::Error;

/// Errors from collaborator repositories (state store, domain queries).
///
/// Trait definitions in frontis-core return these; implementations live
/// in frontis-infra.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}
