//! Error types for SQL generation.

use thiserror::Error;

/// Errors raised while compiling expressions or rendering SQL.
///
/// Every variant is a synchronous validation failure: it is detected before
/// any statement text reaches a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The predicate AST contains a node shape the compiler cannot translate.
    #[error("expression not supported: {0}")]
    ExpressionNotSupported(String),

    /// A method-style predicate other than Contains/StartsWith/EndsWith.
    #[error("method call '{0}' is not supported in a predicate")]
    MethodCallNotSupported(String),

    /// A binary operator that has no SQL rendering in this position.
    #[error("binary operator '{0}' is not supported here")]
    BinaryOperatorNotSupported(String),

    /// No dialect mapping for a logical column type and no custom override.
    #[error("data type '{0}' is not supported by this dialect")]
    DataTypeNotSupported(String),

    /// An invalid constraint combination, e.g. auto-increment on a string.
    #[error("constraint error: {0}")]
    Constraint(String),

    /// The requested operation is not valid for the current builder state.
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Result type alias for SQL generation.
pub type Result<T> = std::result::Result<T, Error>;
