use thiserror::Error;

use crate::store::StorageError;

/// Errors from talking to the sync server.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No stored session token
    #[error("Not logged in. Run `gains auth login` first.")]
    NotAuthenticated,

    /// The server did not answer the health check
    #[error("Server is unreachable")]
    Offline,

    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success answer from the server
    #[error("Server returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Rejected credentials or token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Local store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Body that could not be encoded or decoded
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// True for failures caused by an expired or rejected session.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::NotAuthenticated | SyncError::Auth(_))
    }
}
