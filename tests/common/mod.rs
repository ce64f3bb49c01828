#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};

use mysql_mcp_gateway::testing::FakeConnector;
use mysql_mcp_gateway::{app, AppState};

pub use mysql_mcp_gateway::testing::row;

pub const API_KEY: &str = "test-api-key";

pub struct TestServer {
    pub base_url: String,
    pub db: FakeConnector,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve the real router on an ephemeral port, backed by `db`
pub async fn spawn_server(db: FakeConnector) -> Result<TestServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    let state = AppState::new(API_KEY, Arc::new(db.clone()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        db,
    })
}
