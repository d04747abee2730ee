//! HTTP front-end for one monitored session.

pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use models::HttpServerError;
pub use state::AppState;
