use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::errors::AppError;
use crate::state::AppState;

const INTERNAL_API_KEY_HEADER: &str = "x-internal-api-key";

/// Middleware guarding the internal operational endpoints. The request must
/// carry an `x-internal-api-key` header matching one of the configured keys.
pub async fn require_internal_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided_key = request
        .headers()
        .get(INTERNAL_API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty());

    match provided_key {
        Some(key) if state.config.internal_api_keys.contains(key) => Ok(next.run(request).await),
        _ => Err(AppError::Unauthorized),
    }
}
