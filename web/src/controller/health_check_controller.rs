use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use log::*;

use crate::AppState;

/// GET the health of the API router
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = String),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    trace!(
        "Health check with {} open event stream(s)",
        app_state.stream_manager.active_streams()
    );
    (StatusCode::OK, "healthy")
}
