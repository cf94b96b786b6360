use std::io;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A command was issued while the aggregate guard was false. Nothing is
    /// appended; the caller must surface this as a rejected command.
    #[error("Cannot {action} change {change_id}: rejected by the aggregate guard")]
    GuardViolation {
        action: &'static str,
        change_id: Uuid,
    },

    #[error("Malformed period: {0}")]
    MalformedPeriod(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
