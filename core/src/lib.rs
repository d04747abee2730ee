pub mod api;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod monitor;
pub mod persist;
pub mod score;
pub mod violation;

pub use engine::Engine;
