//! Errors surfaced to callers of the dispatcher.
//!
//! Individual provider failures never appear here; they are logged and the
//! dispatcher moves on to the next provider.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for delivery operations.
pub type MailerResult<T> = Result<T, DeliveryError>;

/// Errors that end a `send` call.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Missing recipient or subject
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Every provider failed or none was configured, and the debug copy could not be written
    #[error("Message not delivered: could not write debug email to {}: {source}", path.display())]
    DebugStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
