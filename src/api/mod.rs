//! HTTP API layer

pub mod handlers;

pub use handlers::AppState;
