//! Error types for bug record storage.

/// Errors that can occur during record store operations.
///
/// Malformed identifiers are rejected at the API boundary before the store
/// is consulted, so they never appear here; validation failures likewise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStoreError {
    /// The requested record was not found in the store.
    NotFound,
    /// A record with the same identifier already exists.
    AlreadyExists,
    /// JSON serialization or deserialization failed.
    SerializationError(String),
    /// An internal storage engine error occurred.
    Internal(String),
}

impl std::fmt::Display for DataStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Record not found in data store"),
            Self::AlreadyExists => write!(f, "Record already exists in data store"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<sqlx::Error> for DataStoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => DataStoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DataStoreError::AlreadyExists
            }
            _ => DataStoreError::Internal(e.to_string()),
        }
    }
}

impl std::error::Error for DataStoreError {}
