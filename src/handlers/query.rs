// handlers/query.rs - POST /query handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::error::ApiError;
use crate::mcp::{McpResponse, QueryBody};

/// POST /query - run one MCP verb. Soft dispatcher errors become 400.
pub async fn query_post(
    State(state): State<AppState>,
    payload: Result<Json<QueryBody>, JsonRejection>,
) -> Result<Json<McpResponse>, ApiError> {
    let Json(body) = payload?;
    let request = body.mcp_request;

    tracing::info!("Handling verb {}", request.verb_label());

    let response = state.dispatcher.dispatch(&request).await?;

    if let Some(message) = response.error_message() {
        return Err(ApiError::bad_request(message));
    }

    Ok(Json(response))
}
