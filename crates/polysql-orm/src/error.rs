//! Error types for the data-access layer.

use thiserror::Error;

/// Errors surfaced by providers, transactions and row mapping.
#[derive(Debug, Error)]
pub enum OrmError {
    /// SQL generation failed before anything was executed.
    #[error(transparent)]
    Core(#[from] polysql_core::Error),

    /// The connection provider reported a failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// A row could not be mapped onto a model.
    #[error("row mapping error: {0}")]
    Mapping(String),

    /// No row matched a single-row fetch.
    #[error("no row matched the query")]
    NotFound,

    /// More than one row matched a single-row fetch.
    #[error("multiple rows matched a single-row query")]
    MultipleRows,
}

/// Result type alias for data-access operations.
pub type Result<T> = std::result::Result<T, OrmError>;
