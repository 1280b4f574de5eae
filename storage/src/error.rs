//! Storage error types.
//!
//! Used by repository implementations and callers of storage APIs.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Compare-and-swap on the user's conversation state lost against another writer.
    #[error("State conflict for user {user_id}: expected {expected}, found {actual}")]
    StateConflict {
        user_id: i64,
        expected: String,
        actual: String,
    },
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}
