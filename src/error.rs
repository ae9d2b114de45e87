use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RolodexError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("invalid engine URL: {0}")]
    EngineUrl(String),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),
}

impl IntoResponse for RolodexError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            RolodexError::Database(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: "DATABASE_UNAVAILABLE".to_string(),
                    message: "The contact store is temporarily unavailable.".to_string(),
                },
            ),
            RolodexError::UrlParse(_) | RolodexError::EngineUrl(_) | RolodexError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
