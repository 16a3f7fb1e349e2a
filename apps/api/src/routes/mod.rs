pub mod health;
pub mod metrics;
pub mod ready;
pub mod v1;

use axum::{middleware, routing::get, Router};

use crate::auth::require_internal_api_key;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let internal = Router::new()
        .route("/readyz", get(ready::readyz_handler))
        .route("/metrics", get(metrics::metrics_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_internal_api_key,
        ));

    Router::new()
        .route("/healthz", get(health::healthz_handler))
        .route("/v1/now", get(v1::now::get_now))
        .route("/v1/uses", get(v1::uses::get_uses))
        .route("/v1/projects", get(v1::projects::list_projects))
        .route("/v1/posts", get(v1::posts::list_posts))
        .route("/v1/posts/:slug", get(v1::posts::get_post))
        .merge(internal)
        .with_state(state)
}
