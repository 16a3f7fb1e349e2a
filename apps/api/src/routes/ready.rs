use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::db::check_database_readiness;
use crate::state::AppState;

/// GET /readyz (internal)
/// 200 when the database, migrations, and query path all check out; 503 otherwise.
pub async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = check_database_readiness(&state.db).await;

    let status = if readiness.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(readiness))
}
