use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::fulfilment::delivery::DeliveryError;
use crate::fulfilment::queue::QueueError;
use crate::fulfilment::quota::QuotaError;
use crate::fulfilment::FulfilmentError;
use crate::generation::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Quota ledger error: {0}")]
    Quota(#[from] QuotaError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::MissingFields(fields) => AppError::MissingFields(fields),
            other => AppError::Generation(other.to_string()),
        }
    }
}

impl From<FulfilmentError> for AppError {
    fn from(e: FulfilmentError) -> Self {
        match e {
            FulfilmentError::MissingFields(fields) => AppError::MissingFields(fields),
            FulfilmentError::QuotaExhausted => {
                AppError::QuotaExhausted(FulfilmentError::QuotaExhausted.to_string())
            }
            FulfilmentError::Pipeline(e) => e.into(),
            FulfilmentError::Quota(e) => AppError::Quota(e),
            FulfilmentError::Delivery(e) => AppError::Delivery(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingFields(fields) => {
                let body = Json(json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": self.to_string(),
                        "missing_fields": fields,
                    }
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::QuotaExhausted(msg) => (StatusCode::FORBIDDEN, "QUOTA_EXHAUSTED", msg.clone()),
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "The cover letter could not be generated".to_string(),
                )
            }
            AppError::Delivery(e) => {
                tracing::error!("Delivery error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "DELIVERY_ERROR",
                    "The cover letter could not be delivered".to_string(),
                )
            }
            AppError::Quota(e) => {
                tracing::error!("Quota ledger error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Queue(e) => {
                tracing::error!("Queue error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "QUEUE_ERROR",
                    "The request could not be queued".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
