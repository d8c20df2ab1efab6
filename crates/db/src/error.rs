use thiserror::Error;

/// Errors surfaced by persistence gateways.
#[derive(Debug, Error)]
pub enum DbError {
    /// No active (non soft-deleted) record matches the given id.
    #[error("no active record with id {0}")]
    NotFound(i64),

    #[error(transparent)]
    Query(#[from] sqlx::Error),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}
