//! Error types for mapping-session operations

use thiserror::Error;

/// Errors that can occur while configuring or driving a mapping session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid session configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to establish or keep a connection to the database
    #[error("connection failed: {0}")]
    Connection(String),

    /// Schema synchronization failed
    #[error("schema sync failed: {0}")]
    Schema(String),

    /// Query execution or row decoding failed
    #[error("query failed: {0}")]
    Query(String),

    /// Record references an entity that was never declared
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// Record references a column the entity does not declare
    #[error("unknown column '{column}' on entity '{entity}'")]
    UnknownColumn { entity: String, column: String },

    /// Staged value does not match the declared column type
    #[error("type mismatch for '{entity}.{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        entity: String,
        column: String,
        expected: String,
        actual: String,
    },

    /// Required column missing from a staged record
    #[error("missing value for required column '{column}' on entity '{entity}'")]
    MissingColumn { entity: String, column: String },

    /// NULL staged for a column declared NOT NULL
    #[error("null value for non-nullable column '{column}' on entity '{entity}'")]
    NullNotAllowed { entity: String, column: String },

    /// The shared context was requested but the session does not allow it
    #[error("global context is not enabled for this session")]
    GlobalContextDisabled,
}

impl From<sqlx::Error> for SessionError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Configuration(_) => SessionError::Connection(e.to_string()),
            sqlx::Error::Io(_) => SessionError::Connection(e.to_string()),
            sqlx::Error::Tls(_) => SessionError::Connection(e.to_string()),
            sqlx::Error::PoolTimedOut => SessionError::Connection(e.to_string()),
            sqlx::Error::PoolClosed => SessionError::Connection(e.to_string()),
            sqlx::Error::Database(_) => SessionError::Query(e.to_string()),
            _ => SessionError::Query(e.to_string()),
        }
    }
}
