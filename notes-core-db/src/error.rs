//! Storage error types.

use thiserror::Error;

/// Errors reported by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Row does not exist.
    #[error("{table} {key} not found")]
    NotFound { table: &'static str, key: String },

    /// Write rejected by a uniqueness constraint.
    #[error("conflict in {table}: {message}")]
    Conflict { table: &'static str, message: String },

    /// Query failed.
    #[error("database query error: {message}")]
    Query { message: String },

    /// Connection could not be established or was lost.
    #[error("database connection error: {message}")]
    Connection { message: String },

    /// Transaction misuse or commit failure.
    #[error("transaction error: {message}")]
    Transaction { message: String },

    /// Column is not part of the entity's table.
    #[error("unknown column {column} on {table}")]
    InvalidColumn { table: &'static str, column: String },

    /// Row could not be encoded or decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl StoreError {
    pub fn not_found(table: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            table,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
