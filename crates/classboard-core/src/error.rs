//! Error types for board operations.
//!
//! Unresolved ids, rejected containment and exhausted history are not errors:
//! those operations return `false`/`None` so that sync races never crash a peer.

use crate::storage::StorageError;
use thiserror::Error;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors surfaced at the board's boundaries.
#[derive(Debug, Error)]
pub enum BoardError {
    /// An inbound sync message or record could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The persistence collaborator failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A configuration value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
