//! Error types for frame and store operations.

use thiserror::Error;

/// Failures surfaced by the mapper.
///
/// There are exactly two kinds: the store rejected a statement, or the
/// caller handed us arguments we cannot work with. Nothing is retried or
/// suppressed internally; batch operations abort on the first failure and
/// leave earlier statements applied unless an `_atomic` variant was used.
#[derive(Debug, Error)]
pub enum DbError {
    /// The store rejected a statement: syntax, constraint violation, lock
    /// contention, missing table or column.
    #[error("failed to execute statement: {0}")]
    Execution(#[from] rusqlite::Error),

    /// The caller omitted or malformed a required argument.
    #[error("invalid parameter: {0}")]
    Parameter(String),
}

impl DbError {
    pub(crate) fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DbError>;
