use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encode error")]
    Serialize(#[source] serde_json::Error),

    #[error("persisted state at {path} is unreadable: {reason}")]
    CorruptState { path: String, reason: String },

    #[error("persistence writer is closed")]
    ChannelClosed,
}

impl PersistError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PersistError::Io { .. })
    }
}
