//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `proctor_core::api` instead of reaching into internal modules.

pub use crate::classifier::{Sample, SignalClassifier, SkipReason};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{
    load_default, load_from_path, AppConfig, ClassifierConfig, DebounceConfig, HttpServerConfig,
    LoggingConfig, PersistenceConfig, WeightsConfig,
};
pub use crate::debounce::{DebounceGate, LogThrottle};
pub use crate::engine::{Engine, SampleOutcome};
pub use crate::errors::{ConfigError, EngineError, PersistError};
pub use crate::ledger::{ViolationCounter, ViolationLedger};
pub use crate::monitor::{spawn_monitor, MonitorHandle};
pub use crate::persist::{
    load_or_default, start_persistence, ActivityLogEntry, JsonFileSink, PersistenceSink,
    PersistenceTx,
};
pub use crate::score::{compute_score, label_for, TrustLabel, TrustSnapshot, MAX_SCORE};
pub use crate::violation::{ViolationCategory, WeightTable};
