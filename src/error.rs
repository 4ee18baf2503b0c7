use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixpointError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid renewal: {0}")]
    InvalidRenewal(String),

    #[error("OTP verification failed: {0}")]
    OtpMismatch(String),

    #[error("Insufficient leave balance: {0}")]
    InsufficientBalance(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// String form so handlers can hand the message straight to the frontend.
impl Serialize for FixpointError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type FixpointResult<T> = Result<T, FixpointError>;

impl IntoResponse for FixpointError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            FixpointError::Database(ref e) => {
                tracing::error!("Database Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("DB Error: {}", e),
                )
            }
            FixpointError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            FixpointError::InvalidRange(msg) => (StatusCode::BAD_REQUEST, msg),
            FixpointError::InvalidRenewal(msg) => (StatusCode::BAD_REQUEST, msg),
            FixpointError::OtpMismatch(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            FixpointError::InsufficientBalance(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            FixpointError::Internal(msg) => {
                tracing::error!("Internal Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
            FixpointError::Io(e) => {
                tracing::error!("IO Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A file system error occurred.".to_string(),
                )
            }
            _ => {
                tracing::error!("Unhandled Error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unknown error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
