use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown violation category: {0}")]
    UnknownCategory(String),

    #[error("unknown trust label: {0}")]
    UnknownLabel(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("persistence error: {0}")]
    Persist(#[from] super::PersistError),
}
