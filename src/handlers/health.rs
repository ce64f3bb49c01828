// handlers/health.rs - GET /health handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::release;

/// Opens and closes one connection. Always 200; failures are reported in the body.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    match state.connector.connect().await {
        Ok(session) => {
            release(session).await;
            Json(json!({
                "status": "ok",
                "database_connection": "successful"
            }))
        }
        Err(e) => Json(json!({
            "status": "error",
            "database_connection": "failed",
            "detail": e.to_string()
        })),
    }
}
