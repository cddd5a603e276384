//! API error type and its JSON response body.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marketplace_prover::{CalldataError, ProverError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `CONSTRAINT_VIOLATION`
    pub code: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request values could not be parsed (400).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The inputs parse but do not satisfy the purchase relation (422).
    #[error("{0}")]
    ConstraintViolation(String),

    /// Proof generation exceeded the configured timeout (504).
    #[error("proof generation timed out after {0:?}")]
    Timeout(Duration),

    /// Logged, never returned to the client (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Self::ConstraintViolation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CONSTRAINT_VIOLATION")
            }
            Self::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            Self::Timeout(_) => {
                tracing::warn!(error = %self, "proof generation timed out");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProverError> for ApiError {
    fn from(err: ProverError) -> Self {
        match err {
            ProverError::InvalidInput(_) => Self::InvalidInput(err.to_string()),
            ProverError::ConstraintViolation(_) => Self::ConstraintViolation(err.to_string()),
            ProverError::Proving(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<CalldataError> for ApiError {
    fn from(err: CalldataError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use marketplace_circuits::Violation;

    async fn response_parts(err: ApiError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_constraint_violation_is_422() {
        let err = ApiError::from(ProverError::ConstraintViolation(
            Violation::InsufficientBalance,
        ));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "CONSTRAINT_VIOLATION");
        assert!(body.error.message.starts_with("Constraint doesn't match"));
    }

    #[tokio::test]
    async fn test_timeout_is_504() {
        let (status, body) = response_parts(ApiError::Timeout(Duration::from_millis(250))).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body.error.code, "TIMEOUT");
        assert_eq!(body.error.message, "proof generation timed out after 250ms");
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let err = ApiError::from(ProverError::Proving("pairing engine on fire".into()));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("on fire"));
    }
}
