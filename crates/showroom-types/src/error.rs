use thiserror::Error;

/// Errors from repository operations (used by trait definitions in showroom-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised while decoding or resolving a navigation token.
#[derive(Debug, Error)]
pub enum NavError {
    /// The token is malformed or describes an impossible view.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token decoded fine but the entity it points at no longer exists.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A single wizard input failed its step validator.
///
/// Always locally recoverable: the step re-prompts and the draft is left
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors from the bounded image collector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectorError {
    #[error("image limit reached ({capacity} max)")]
    CapacityExceeded { capacity: usize },

    #[error("image {0} not found")]
    NotFound(u64),

    #[error("at least {minimum} image(s) required")]
    EmptyCollection { minimum: usize },
}

/// Errors from committing a draft to the catalog.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The draft violates a product invariant. The draft is kept so the
    /// user can correct it and retry.
    #[error("draft validation failed: {0}")]
    ValidationFailed(String),

    /// The draft's category or subcategory is gone or no longer matches.
    /// The user has to pick the placement again; the rest of the draft stays.
    #[error("placement no longer valid: {0}")]
    PlacementInvalid(String),

    /// The write failed as a whole; no rows were written.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A `(step, event)` pair with no entry in a wizard's transition table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal transition: {event} in step {step}")]
pub struct IllegalTransition {
    pub step: String,
    pub event: String,
}

/// Errors surfaced by a conversation handler to the session boundary.
///
/// `IllegalTransition` is answered with a notice and leaves the session as
/// it was. Everything else is an internal fault: logged, session reset.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    #[error(transparent)]
    Navigation(#[from] NavError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("name", "must be at least 2 characters");
        assert_eq!(err.to_string(), "name: must be at least 2 characters");
    }

    #[test]
    fn test_nav_not_found_display() {
        let err = NavError::NotFound {
            entity: "product",
            id: 7,
        };
        assert_eq!(err.to_string(), "product 7 not found");
    }

    #[test]
    fn test_commit_error_from_repository() {
        let err: CommitError = RepositoryError::Connection.into();
        assert!(matches!(err, CommitError::Repository(RepositoryError::Connection)));
    }
}
