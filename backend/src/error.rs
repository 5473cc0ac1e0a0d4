//! Application error handling
//!
//! [`ApiError`] covers the regular API and renders `{ error: { code, message } }`.
//! [`GenerationError`] covers the plan generation gateway and renders the
//! gateway's `{ success: false, error, details, timestamp }` envelope.

use crate::services::plan_model::PlanModelError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fitcoach_shared::errors::{CompletionRejected, PlanContractError};
use fitcoach_shared::plan::GenerationFailure;
use fitcoach_shared::types::{ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Completion(#[from] CompletionRejected),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Completion(rejected) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "COMPLETION_REJECTED",
                rejected.to_string(),
            ),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let field = match &self {
            ApiError::Completion(rejected) => Some(rejected.kind().to_string()),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Plan generation failures
///
/// Each variant maps to a non-200 status; the body always uses the failure
/// envelope with a generic `error` and the cause in `details`.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("A plan is already being generated for this user")]
    InProgress,

    #[error("Plan generation is disabled")]
    Disabled,

    #[error(transparent)]
    Model(#[from] PlanModelError),

    #[error(transparent)]
    Contract(#[from] PlanContractError),

    #[error("Failed to store the generated plan")]
    Persistence(#[source] anyhow::Error),
}

impl GenerationError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerationError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GenerationError::InvalidProfile(_) => StatusCode::BAD_REQUEST,
            GenerationError::InProgress => StatusCode::CONFLICT,
            GenerationError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::Model(_) | GenerationError::Contract(_) => StatusCode::BAD_GATEWAY,
            GenerationError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label
    pub fn outcome(&self) -> &'static str {
        match self {
            GenerationError::Unauthorized(_) => "unauthorized",
            GenerationError::InvalidProfile(_) => "invalid_profile",
            GenerationError::InProgress => "in_progress",
            GenerationError::Disabled => "disabled",
            GenerationError::Model(_) => "model_error",
            GenerationError::Contract(_) => "contract_error",
            GenerationError::Persistence(_) => "persistence_error",
        }
    }

    fn details(&self) -> String {
        match self {
            GenerationError::Persistence(err) => format!("{}: {:#}", self, err),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let body = GenerationFailure::new("Plan generation failed", self.details());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chrono::NaiveDate;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error_status() {
        let response = ApiError::Validation("Invalid input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unauthorized_error_status() {
        let response = ApiError::Unauthorized("Invalid token".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_completion_rejection_is_unprocessable() {
        let rejected = CompletionRejected::NotScheduledToday {
            scheduled_for: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        };
        let response = ApiError::from(rejected).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "COMPLETION_REJECTED");
        assert_eq!(body["error"]["field"], "not_today");
        assert!(body["error"]["message"].as_str().unwrap().contains("2024-01-08"));
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = ApiError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_generation_error_envelope() {
        let response = GenerationError::from(PlanContractError::MissingKey("nutritionPlan")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Plan generation failed");
        assert!(body["details"].as_str().unwrap().contains("nutritionPlan"));
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_in_progress_is_conflict() {
        assert_eq!(GenerationError::InProgress.status(), StatusCode::CONFLICT);
        assert_eq!(GenerationError::InProgress.outcome(), "in_progress");
    }
}
