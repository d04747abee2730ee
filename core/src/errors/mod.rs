mod config_error;
mod engine_error;
mod persist_error;

pub use config_error::ConfigError;
pub use engine_error::EngineError;
pub use persist_error::PersistError;
