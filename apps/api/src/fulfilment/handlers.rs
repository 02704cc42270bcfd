//! Axum route handlers for the cover-letter API.

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::fulfilment::queue::LetterJob;
use crate::fulfilment::validate_for_delivery;
use crate::models::letter::RawInputBundle;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub title: String,
    pub remaining_letters: u32,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub status: String,
    pub job_id: Uuid,
}

/// POST /api/v1/cover-letters
///
/// Generates the letter, e-mails it and returns the remaining allowance.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(bundle): Json<RawInputBundle>,
) -> Result<Json<GenerateResponse>, AppError> {
    let outcome = state.letters.fulfil(&bundle).await?;

    Ok(Json(GenerateResponse {
        message: "Cover letter generated and sent".to_string(),
        title: outcome.title,
        remaining_letters: outcome.remaining_letters,
    }))
}

/// POST /api/v1/cover-letters/enqueue
///
/// Validates the request and defers generation to the background worker.
pub async fn handle_enqueue(
    State(state): State<AppState>,
    Json(bundle): Json<RawInputBundle>,
) -> Result<Json<EnqueueResponse>, AppError> {
    validate_for_delivery(&bundle)?;

    let job = LetterJob::new(bundle, state.config.enqueue_delay);
    state.queue.enqueue(&job).await?;

    Ok(Json(EnqueueResponse {
        status: "queued".to_string(),
        job_id: job.id,
    }))
}
