//! Two independent debounce layers: per-category re-fire windows
//! ([`DebounceGate`]) and the global activity-log write limiter
//! ([`LogThrottle`]).

mod gate;
mod throttle;

pub use gate::DebounceGate;
pub use throttle::LogThrottle;
