// handlers/mod.rs - HTTP endpoints
//
// Public (no auth): /, /health
// Protected (bearer token): /query
pub mod health;
pub mod query;
pub mod root;

pub use health::health;
pub use query::query_post;
pub use root::root;
