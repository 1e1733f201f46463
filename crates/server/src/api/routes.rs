use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, ingest, library, logs, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Link submission
        .route("/ingest", post(ingest::ingest))
        .route("/movies", post(ingest::add_movies))
        .route("/episodes", post(ingest::add_episodes))
        // Day logs
        .route("/logs/{category}", get(logs::list_days))
        .route(
            "/logs/{category}/{date}",
            get(logs::get_day).delete(logs::delete_day),
        )
        .route("/logs/{category}/{date}/refresh", post(logs::refresh_day))
        // Library
        .route("/library/recent", get(library::recent))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
