use axum::http::header;
use axum::response::IntoResponse;

use crate::metrics::{render_metrics, METRICS_CONTENT_TYPE};

/// GET /metrics (internal)
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        render_metrics(),
    )
}
