mod engine;
mod types;

pub use engine::Engine;
pub use types::SampleOutcome;
