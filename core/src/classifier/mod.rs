mod classify;
mod sample;

pub use classify::SignalClassifier;
pub use sample::{Sample, SkipReason};
