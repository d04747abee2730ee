mod file_sink;
mod sink;
mod writer;

pub use file_sink::JsonFileSink;
pub use sink::{load_or_default, ActivityLogEntry, PersistenceSink};
pub use writer::{start_persistence, PersistenceTx};
