//! Letter fulfilment. Wraps the generation pipeline with the quota check,
//! document assembly, e-mail delivery and usage accounting.
//!
//! Side effects happen only after every section was generated. Usage is
//! recorded only after delivery succeeded.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::generation::pipeline::{LetterPipeline, PipelineError};
use crate::models::letter::{LetterInputs, RawInputBundle};

pub mod assembly;
pub mod delivery;
pub mod handlers;
pub mod queue;
pub mod quota;

use assembly::LetterDocument;
use delivery::{DeliveryError, LetterDelivery};
use quota::{remaining, QuotaError, QuotaLedger};

#[derive(Debug, Error)]
pub enum FulfilmentError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Your free cover letters have run out")]
    QuotaExhausted,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

#[derive(Debug, Clone, Serialize)]
pub struct FulfilmentOutcome {
    pub title: String,
    pub remaining_letters: u32,
}

pub struct LetterService {
    pipeline: LetterPipeline,
    quota: Arc<dyn QuotaLedger>,
    delivery: Arc<dyn LetterDelivery>,
    free_letter_limit: u32,
}

impl LetterService {
    pub fn new(
        pipeline: LetterPipeline,
        quota: Arc<dyn QuotaLedger>,
        delivery: Arc<dyn LetterDelivery>,
        free_letter_limit: u32,
    ) -> Self {
        Self {
            pipeline,
            quota,
            delivery,
            free_letter_limit,
        }
    }

    /// Generates, delivers and accounts for one letter.
    pub async fn fulfil(&self, bundle: &RawInputBundle) -> Result<FulfilmentOutcome, FulfilmentError> {
        let (inputs, email) = validate_for_delivery(bundle)?;

        let used = self
            .quota
            .usage(&email)
            .await?
            .map(|u| u.num_letters)
            .unwrap_or(0);
        if used >= self.free_letter_limit {
            info!("Refusing letter for {}: {} of {} used", email, used, self.free_letter_limit);
            return Err(FulfilmentError::QuotaExhausted);
        }

        let sections = self.pipeline.generate_letter(bundle).await?;
        let document = LetterDocument::assemble(&inputs, &sections);

        self.delivery.deliver(&email, &document).await?;

        // The letter is already in the user's inbox; a ledger failure must not
        // turn that into an error response.
        let total = match self
            .quota
            .record_letter(&email, &inputs.name, bundle.agree_promo)
            .await
        {
            Ok(total) => total,
            Err(e) => {
                error!("Failed to record letter usage for {}: {e}", email);
                used + 1
            }
        };

        Ok(FulfilmentOutcome {
            title: document.title,
            remaining_letters: remaining(self.free_letter_limit, total),
        })
    }
}

/// Pipeline validation plus the recipient address.
pub fn validate_for_delivery(
    bundle: &RawInputBundle,
) -> Result<(LetterInputs, String), FulfilmentError> {
    let mut missing = bundle.missing_fields();
    let email = bundle
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if email.is_none() {
        missing.push("email".to_string());
    }
    if !missing.is_empty() {
        return Err(FulfilmentError::MissingFields(missing));
    }

    let inputs = bundle.validate().map_err(FulfilmentError::MissingFields)?;
    Ok((inputs, email.unwrap_or_default().to_string()))
}
