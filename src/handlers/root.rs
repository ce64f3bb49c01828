use axum::response::Json;
use serde_json::{json, Value};

pub const SERVICE_NAME: &str = "MySQL MCP Web Server";

/// GET / - service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "A secure web API to interact with a MySQL database.",
        "endpoints": {
            "query": "POST /query (bearer token)",
            "health": "GET /health (public)",
        },
        "verbs": ["list_resources", "read", "execute"]
    }))
}
