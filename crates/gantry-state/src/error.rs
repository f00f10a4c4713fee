//! Error types for the Gantry parameter store.

use thiserror::Error;

/// Result type alias for parameter store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during parameter store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("parameter {param} holds a non-numeric count: {value:?}")]
    Parse { param: String, value: String },

    #[error("compare-and-swap on {0} exhausted its retries")]
    Contended(String),
}
