/// Error handling for the API server
///
/// Handlers return [`ApiResult`]; domain errors convert into [`ApiError`]
/// with `?` and render as a JSON body:
///
/// ```json
/// { "error": "not_found", "message": "Todo ... not found" }
/// ```
///
/// # Example
///
/// ```
/// use todoflow_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<&'static str>> {
///     Err(ApiError::NotFound("nothing here".to_string()))
/// }
/// ```

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use todoflow_shared::service::TodoError;

pub use todoflow_shared::service::ValidationErrorDetail;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unprocessable entity (422)
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Logged here, never sent to the client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::Unauthenticated => ApiError::Unauthorized("Not authenticated".to_string()),
            TodoError::NotFound(id) => ApiError::NotFound(format!("Todo {} not found", id)),
            TodoError::Forbidden => {
                ApiError::Forbidden("Not authorized to access this todo".to_string())
            }
            TodoError::Validation(details) => ApiError::ValidationError(details),
            TodoError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoflow_shared::store::StoreError;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases = [
            (TodoError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (TodoError::NotFound(Uuid::new_v4()), StatusCode::NOT_FOUND),
            (TodoError::Forbidden, StatusCode::FORBIDDEN),
            (TodoError::Validation(vec![]), StatusCode::UNPROCESSABLE_ENTITY),
            (
                TodoError::Store(StoreError::Unavailable("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_error_body() {
        let err = ApiError::ValidationError(vec![ValidationErrorDetail::new(
            "title",
            "Title cannot be empty",
        )]);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");

        let body = ErrorResponse {
            error: "validation_error".to_string(),
            message: "Request validation failed".to_string(),
            details: Some(vec![ValidationErrorDetail::new("title", "Title cannot be empty")]),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"][0]["field"], "title");
    }

    #[tokio::test]
    async fn test_bad_request_body() {
        let response = ApiError::BadRequest("unknown variant `done`".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "bad_request");
        assert_eq!(body.message, "unknown variant `done`");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let body = ErrorResponse {
            error: "not_found".to_string(),
            message: "Todo not found".to_string(),
            details: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("details").is_none());
    }
}
