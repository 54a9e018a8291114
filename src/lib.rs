// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod poll;
pub mod routes;
pub mod state;
pub mod utils;
pub mod widgets;

// Re-export specific items for convenience if needed
pub use error::ClientError;
pub use state::AppState;
