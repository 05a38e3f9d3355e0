use crate::server::{handlers, types::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route(
            "/",
            get(handlers::health_check).post(handlers::health_check),
        )
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .route("/metrics", get(handlers::render_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
