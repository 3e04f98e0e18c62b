//! HTTP endpoints next to the WebSocket route.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "a-tree-server";

/// Body of the health check
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
}

/// Health check.
///
/// GET /
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "ok",
    })
}

/// Browser page for poking at the WebSocket endpoint by hand.
///
/// GET /test
///
/// The file is read on every request so it can be edited without a restart.
pub async fn test_page(State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read_to_string(&state.test_page_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %state.test_page_path.display(), "Test page not found");
            (StatusCode::NOT_FOUND, "Test page not found").into_response()
        }
        Err(e) => {
            tracing::error!(
                path = %state.test_page_path.display(),
                error = %e,
                "Failed to read test page"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read test page").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body_field_order() {
        let Json(body) = health().await;
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"service":"a-tree-server","status":"ok"}"#);
    }
}
