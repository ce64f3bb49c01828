use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::database::{Connector, MySqlConnector};
use crate::handlers;
use crate::mcp::Dispatcher;
use crate::middleware::bearer_auth_middleware;

/// Shared, read-only per-process state
#[derive(Clone)]
pub struct AppState {
    pub api_key: Arc<str>,
    pub connector: Arc<dyn Connector>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(api_key: impl Into<Arc<str>>, connector: Arc<dyn Connector>) -> Self {
        Self {
            api_key: api_key.into(),
            dispatcher: Dispatcher::new(connector.clone()),
            connector,
        }
    }

    /// State backed by a real MySQL connector built from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let connector = Arc::new(MySqlConnector::new(&config.database));
        Self::new(config.security.api_key.as_str(), connector)
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Protected
        .merge(query_routes(state.clone()))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn query_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/query", post(handlers::query_post))
        .route_layer(middleware::from_fn_with_state(state, bearer_auth_middleware))
}
