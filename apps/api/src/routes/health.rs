use axum::Json;
use serde_json::{json, Value};

/// GET /healthz
/// Pure liveness; no dependencies are touched.
pub async fn healthz_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
