use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use medialib_core::MediaError;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    Auth(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    /// A batch where some items failed; `failed` lists them in input order.
    Batch { message: String, failed: Vec<String> },
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, failed) = match self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Batch { message, failed } => (StatusCode::BAD_REQUEST, message, Some(failed)),
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: message,
            failed,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        let message = e.to_string();
        match e {
            MediaError::Unauthorized => AppError::Auth("Unauthorized".to_string()),
            MediaError::Forbidden(reason) => AppError::Forbidden(reason),
            MediaError::NotFound => AppError::NotFound("Not found".to_string()),
            MediaError::BadRequest(reason) => AppError::BadRequest(reason),
            MediaError::BatchPartialFailure { failed, .. } => AppError::Batch { message, failed },
            MediaError::Store(_) => AppError::Internal(message),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", e);
        AppError::Internal("Internal server error".to_string())
    }
}
