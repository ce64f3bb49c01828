pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod middleware;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use app::{app, AppState};
