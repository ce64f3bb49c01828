use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

/// Bearer-token middleware: the token must equal the configured API key.
/// Runs before the body is read, so rejected requests never reach the database.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|msg| {
        tracing::warn!("Rejected request: {}", msg);
        ApiError::unauthorized()
    })?;

    if token != state.api_key.as_ref() {
        tracing::warn!("Rejected request: bearer token does not match");
        return Err(ApiError::unauthorized());
    }

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    // Compared verbatim: padding around the token is part of it
    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}
