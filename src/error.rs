//! Core error kinds shared by the ledger, insights, and API layers.

use thiserror::Error;

/// Errors produced by ledger and read-path operations.
///
/// The API layer maps these onto HTTP statuses: `NotFound` → 404,
/// `InvalidInput` → 400, `Unauthorized` → 401, `Persistence` → 500.
#[derive(Debug, Error)]
pub enum QuestError {
    /// A referenced quest, completion, or profile does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A required field is missing or a value is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An identity-scoped operation was called without an identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Underlying store failure, surfaced to clients as an opaque 500.
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),
}

impl QuestError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type QuestResult<T> = Result<T, QuestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            QuestError::not_found("quest abc").to_string(),
            "quest abc not found"
        );
        assert_eq!(
            QuestError::invalid("name must not be empty").to_string(),
            "invalid input: name must not be empty"
        );
    }

    #[test]
    fn persistence_wraps_rusqlite() {
        let err = QuestError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, QuestError::Persistence(_)));
    }
}
