use thiserror::Error;

/// Storage failures. `Duplicate` is the storage-enforced uniqueness backstop
/// and is expected under overlapping ingestion runs; everything else is a real
/// database problem.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate call record")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A required environment variable is missing at startup.
#[derive(Debug, Error)]
#[error("{0} not set!")]
pub struct ConfigError(pub &'static str);

/// Outbound message failures, kept apart so the dispatcher can persist the
/// provider's rejection payload verbatim.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("messaging request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("messaging provider rejected message: {0}")]
    Rejected(serde_json::Value),
}

impl SendError {
    /// Serialized form recorded on the call record when a send fails.
    pub fn detail(&self) -> String {
        match self {
            SendError::Transport(e) => e.to_string(),
            SendError::Rejected(v) => v.to_string(),
        }
    }
}
