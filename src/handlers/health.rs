use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use sqlx::AnyConnection;
use tracing::warn;

use crate::error::RolodexError;
use crate::router::RolodexState;

/// Liveness probe. Unlike the page handlers, storage failure here maps to a
/// 503 so the platform can see the degradation.
pub async fn health_check(State(state): State<RolodexState>) -> impl IntoResponse {
    let probe = state
        .db
        .with_session(|_conn: &mut AnyConnection| {
            Box::pin(async move { Ok::<(), RolodexError>(()) })
        })
        .await;

    match probe {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "healthy", "database": "connected"})),
        ),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                    "error": err.to_string(),
                })),
            )
        }
    }
}
