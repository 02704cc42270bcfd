//! Section generation: prompt building, retried backend calls and cleanup
//! for each of the three letter sections.
//!
//! Intro and experience are two-pass (draft, then revision); alignment is a
//! single pass. Only alignment asks for a signature.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::generation::cleanup::{strip_leading_clause, CleanupRules};
use crate::generation::prompts::{
    ALIGNMENT_GENERIC_TEMPLATE, ALIGNMENT_GROUNDED_TEMPLATE, EXPERIENCE_DRAFT_TEMPLATE,
    EXPERIENCE_REVISION_TEMPLATE, INTRO_DRAFT_TEMPLATE, INTRO_REVISION_TEMPLATE,
};
use crate::generation::retry::RetryPolicy;
use crate::language::{LanguageGate, TARGET_LANGUAGE};
use crate::llm_client::prompts::{
    ALIGNMENT_SYSTEM, COACH_SYSTEM, EDITOR_SYSTEM, NO_SIGNATURE_INSTRUCTION,
    SIGNATURE_INSTRUCTION,
};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::letter::{GenerationRequest, LetterInputs, SectionKind};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{section:?} section generation failed: {source}")]
    Backend {
        section: SectionKind,
        #[source]
        source: LlmError,
    },

    #[error("{0:?} section was empty after cleanup")]
    Empty(SectionKind),
}

#[derive(Clone)]
pub struct SectionWriter {
    llm: Arc<dyn TextGenerator>,
    gate: LanguageGate,
    retry: RetryPolicy,
    cleanup: CleanupRules,
}

impl SectionWriter {
    pub fn new(llm: Arc<dyn TextGenerator>, gate: LanguageGate) -> Self {
        Self {
            llm,
            gate,
            retry: RetryPolicy::default(),
            cleanup: CleanupRules::default(),
        }
    }

    /// Produces one cleaned paragraph block for `kind`.
    ///
    /// `grounding` is only read for the alignment section; `None` selects the
    /// generic-values prompt.
    pub async fn generate_section(
        &self,
        kind: SectionKind,
        inputs: &LetterInputs,
        grounding: Option<&str>,
    ) -> Result<String, GenerationError> {
        let text = match kind {
            SectionKind::Intro => self.intro(inputs).await?,
            SectionKind::Experience => self.experience(inputs).await?,
            SectionKind::Alignment => self.alignment(inputs, grounding).await?,
        };

        let cleaned = self.cleanup.clean_response_text(&text);
        if cleaned.trim().is_empty() {
            return Err(GenerationError::Empty(kind));
        }

        info!(section = ?kind, chars = cleaned.len(), "Section generated");
        Ok(cleaned)
    }

    async fn intro(&self, inputs: &LetterInputs) -> Result<String, GenerationError> {
        let points = self.translated(&inputs.intro_points).await;

        let draft_prompt = INTRO_DRAFT_TEMPLATE
            .replace("{signature_rule}", NO_SIGNATURE_INSTRUCTION)
            .replace("{name}", &inputs.name)
            .replace("{role}", &inputs.role)
            .replace("{company}", &inputs.company)
            .replace("{points}", &points);
        let draft = self
            .call(SectionKind::Intro, COACH_SYSTEM, draft_prompt)
            .await?;
        let draft = strip_leading_clause(&draft);

        let revision_prompt = INTRO_REVISION_TEMPLATE
            .replace("{signature_rule}", NO_SIGNATURE_INSTRUCTION)
            .replace("{name}", &inputs.name)
            .replace("{role}", &inputs.role)
            .replace("{company}", &inputs.company)
            .replace("{draft}", &draft);
        self.call(SectionKind::Intro, EDITOR_SYSTEM, revision_prompt)
            .await
    }

    async fn experience(&self, inputs: &LetterInputs) -> Result<String, GenerationError> {
        let points = self.translated(&inputs.experience_points).await;

        let draft_prompt = EXPERIENCE_DRAFT_TEMPLATE
            .replace("{signature_rule}", NO_SIGNATURE_INSTRUCTION)
            .replace("{role}", &inputs.role)
            .replace("{company}", &inputs.company)
            .replace("{points}", &points);
        let draft = self
            .call(SectionKind::Experience, COACH_SYSTEM, draft_prompt)
            .await?;

        let revision_prompt = EXPERIENCE_REVISION_TEMPLATE
            .replace("{signature_rule}", NO_SIGNATURE_INSTRUCTION)
            .replace("{draft}", &draft);
        self.call(SectionKind::Experience, EDITOR_SYSTEM, revision_prompt)
            .await
    }

    async fn alignment(
        &self,
        inputs: &LetterInputs,
        grounding: Option<&str>,
    ) -> Result<String, GenerationError> {
        let signature_rule = SIGNATURE_INSTRUCTION.replace("{name}", &inputs.name);

        let prompt = match grounding.filter(|g| !g.trim().is_empty()) {
            Some(content) => ALIGNMENT_GROUNDED_TEMPLATE
                .replace("{signature_rule}", &signature_rule)
                .replace("{company}", &inputs.company)
                .replace("{content}", content),
            None => {
                info!("No company material available, using generic alignment prompt");
                ALIGNMENT_GENERIC_TEMPLATE
                    .replace("{signature_rule}", &signature_rule)
                    .replace("{company}", &inputs.company)
            }
        };

        self.call(SectionKind::Alignment, ALIGNMENT_SYSTEM, prompt)
            .await
    }

    /// One retried backend call; returns the trimmed raw text.
    async fn call(
        &self,
        section: SectionKind,
        system: &str,
        user_prompt: String,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest {
            system_prompt: system.to_string(),
            user_prompt,
            section_kind: section,
        };

        self.retry
            .run(|| self.llm.generate(&request))
            .await
            .map(|text| text.trim().to_string())
            .map_err(|source| GenerationError::Backend { section, source })
    }

    /// Bullet points in English; the original text when translation fails.
    async fn translated(&self, points: &str) -> String {
        match self.gate.normalize(points, TARGET_LANGUAGE).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Translation failed ({e}), using original bullet points");
                points.to_string()
            }
        }
    }
}
