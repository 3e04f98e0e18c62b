use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{api, state::AppState, ws};

/// Build the full HTTP + WebSocket router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::health))
        .route("/test", get(api::test_page))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
