//! Error types for all record mapping operations.

use thiserror::Error;

use crate::catalog::MetadataHandle;

/// Top-level error type for record mapping operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The store rejected the request's expectation clause.
    #[error("conditional check failed on table '{table}'")]
    ConditionalCheckFailed { table: String },

    /// Any other failure reported by the store client.
    #[error(transparent)]
    Store(StoreError),

    #[error("property '{0}' is not declared in the entity metadata")]
    InvalidProperty(String),

    #[error("metadata handle not registered: {0}")]
    NotFound(MetadataHandle),
}

impl Error {
    /// Whether this error is a failed conditional-expectation check.
    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, Error::ConditionalCheckFailed { .. })
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConditionalCheckFailed { table } => Error::ConditionalCheckFailed { table },
            other => Error::Store(other),
        }
    }
}

/// Malformed entity metadata, detected before registration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("metadata requires a non-empty table name")]
    MissingTableName,

    #[error("metadata requires a non-empty hash key name")]
    MissingHashKey,

    #[error("unknown generator: {0}")]
    UnknownGenerator(String),

    #[error("invalid metadata descriptor: {0}")]
    InvalidDescriptor(String),
}

/// An operation was attempted on a record whose state forbids it.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("hash key '{0}' must hold a value")]
    MissingHashKey(String),

    #[error("record has been deleted")]
    Deleted,

    #[error("record is in an invalid state after a failed write")]
    Invalid,

    #[error("record is already persisted")]
    AlreadyPersisted,

    #[error("record has not been persisted")]
    NotPersisted,

    #[error("a value for key '{0}' is required")]
    MissingKeyValue(String),
}

/// Failures surfaced by a [`StoreClient`](crate::store::StoreClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("conditional check failed on table '{table}'")]
    ConditionalCheckFailed { table: String },

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("service error: {0}")]
    Service(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditional_failure_stays_distinct() {
        let err: Error = StoreError::ConditionalCheckFailed {
            table: "users".to_string(),
        }
        .into();
        assert!(err.is_conditional_check_failed());

        let err: Error = StoreError::Service("throttled".to_string()).into();
        assert!(!err.is_conditional_check_failed());
        assert!(matches!(err, Error::Store(StoreError::Service(_))));
    }

    #[test]
    fn test_display_messages() {
        let err: Error = PreconditionError::MissingHashKey("id".to_string()).into();
        assert_eq!(err.to_string(), "hash key 'id' must hold a value");

        let err: Error = ConfigError::MissingTableName.into();
        assert_eq!(err.to_string(), "metadata requires a non-empty table name");
    }
}
