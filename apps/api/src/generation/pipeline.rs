//! Letter Pipeline: validates the request, then produces all three sections.
//!
//! Flow: validate → intro → experience → (fetch → extract → alignment).
//! Any section failure aborts the whole letter; nothing partial is returned.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::extraction::RelevanceExtractor;
use crate::fetch::WebContentFetcher;
use crate::generation::sections::{GenerationError, SectionWriter};
use crate::models::letter::{LetterInputs, LetterSections, RawInputBundle, SectionKind};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("letter generation exceeded the {}s deadline", .0.as_secs())]
    DeadlineExceeded(Duration),
}

/// How the three independent sections are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionSchedule {
    /// Text-only sections first, the fetch-dependent one last.
    #[default]
    Sequential,
    /// All three at once; the first failure cancels the others.
    Concurrent,
}

#[derive(Clone)]
pub struct LetterPipeline {
    writer: SectionWriter,
    fetcher: WebContentFetcher,
    extractor: RelevanceExtractor,
    schedule: SectionSchedule,
    deadline: Option<Duration>,
}

impl LetterPipeline {
    pub fn new(
        writer: SectionWriter,
        fetcher: WebContentFetcher,
        extractor: RelevanceExtractor,
    ) -> Self {
        Self {
            writer,
            fetcher,
            extractor,
            schedule: SectionSchedule::default(),
            deadline: None,
        }
    }

    pub fn with_schedule(mut self, schedule: SectionSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Validates `bundle` and generates every section, or fails as a whole.
    /// Validation happens before any backend call.
    pub async fn generate_letter(
        &self,
        bundle: &RawInputBundle,
    ) -> Result<LetterSections, PipelineError> {
        let inputs = bundle.validate().map_err(PipelineError::MissingFields)?;
        self.generate_validated(&inputs).await
    }

    async fn generate_validated(
        &self,
        inputs: &LetterInputs,
    ) -> Result<LetterSections, PipelineError> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run_sections(inputs))
                .await
                .map_err(|_| PipelineError::DeadlineExceeded(deadline))?,
            None => self.run_sections(inputs).await,
        }
    }

    async fn run_sections(&self, inputs: &LetterInputs) -> Result<LetterSections, PipelineError> {
        info!(
            "Generating letter for {} ({} at {})",
            inputs.name, inputs.role, inputs.company
        );

        let sections = match self.schedule {
            SectionSchedule::Sequential => {
                let intro = self
                    .writer
                    .generate_section(SectionKind::Intro, inputs, None)
                    .await?;
                let tailored_experience = self
                    .writer
                    .generate_section(SectionKind::Experience, inputs, None)
                    .await?;
                let company_alignment = self.alignment(inputs).await?;
                LetterSections {
                    intro,
                    tailored_experience,
                    company_alignment,
                }
            }
            SectionSchedule::Concurrent => {
                let (intro, tailored_experience, company_alignment) = tokio::try_join!(
                    self.writer.generate_section(SectionKind::Intro, inputs, None),
                    self.writer
                        .generate_section(SectionKind::Experience, inputs, None),
                    self.alignment(inputs),
                )?;
                LetterSections {
                    intro,
                    tailored_experience,
                    company_alignment,
                }
            }
        };

        info!("All sections generated for {}", inputs.company);
        Ok(sections)
    }

    async fn alignment(&self, inputs: &LetterInputs) -> Result<String, GenerationError> {
        let grounding = self.grounding_for(inputs.company_url.as_deref()).await;
        self.writer
            .generate_section(SectionKind::Alignment, inputs, grounding.as_deref())
            .await
    }

    /// Relevant excerpt of the company site, or `None` when there is nothing usable.
    pub async fn grounding_for(&self, company_url: Option<&str>) -> Option<String> {
        let url = company_url?;
        let fetched = self.fetcher.fetch(url).await;

        if !fetched.succeeded {
            warn!(url = %url, "No company content available, alignment will be generic");
            return None;
        }

        let excerpt = self.extractor.extract_relevant(&fetched.extracted_text);
        if excerpt.is_empty() {
            warn!(url = %url, "Company page had no usable sentences");
            return None;
        }

        info!(
            url = %url,
            method = ?fetched.method,
            chars = excerpt.len(),
            "Extracted company material"
        );
        Some(excerpt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::test_support::{
        pipeline_with, sample_bundle, unavailable, FakeLauncher, FakePages, ScriptedGenerator,
    };

    fn offline_pipeline(llm: Arc<ScriptedGenerator>) -> LetterPipeline {
        pipeline_with(
            llm,
            Arc::new(FakePages::failing()),
            Arc::new(FakeLauncher::timing_out()),
        )
    }

    #[tokio::test]
    async fn test_scenario_complete_letter_without_company_url() {
        let llm = Arc::new(ScriptedGenerator::echoing());

        let sections = offline_pipeline(llm.clone())
            .generate_letter(&sample_bundle())
            .await
            .unwrap();

        assert!(!sections.intro.is_empty());
        assert!(!sections.tailored_experience.is_empty());
        assert!(!sections.company_alignment.is_empty());

        let requests = llm.requests();
        assert_eq!(requests.len(), 5);
        let alignment = requests.last().unwrap();
        assert_eq!(alignment.section_kind, SectionKind::Alignment);
        assert!(alignment.user_prompt.contains("signature that ends with Ana"));
        assert!(alignment.user_prompt.contains("no specific information"));
    }

    #[tokio::test]
    async fn test_scenario_missing_role_makes_no_backend_calls() {
        let llm = Arc::new(ScriptedGenerator::echoing());
        let mut bundle = sample_bundle();
        bundle.role = None;

        let result = offline_pipeline(llm.clone()).generate_letter(&bundle).await;

        match result {
            Err(PipelineError::MissingFields(fields)) => assert_eq!(fields, vec!["role"]),
            other => panic!("expected missing fields, got {other:?}"),
        }
        assert!(llm.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_transient_failures_then_success() {
        let llm = Arc::new(ScriptedGenerator::scripted(vec![
            Err(unavailable()),
            Err(unavailable()),
            Ok("Intro draft.".to_string()),
        ]));

        let sections = offline_pipeline(llm.clone())
            .generate_letter(&sample_bundle())
            .await
            .unwrap();

        assert!(!sections.intro.is_empty());
        let requests = llm.requests();
        // three attempts for the intro draft, then one call per remaining pass
        assert_eq!(requests.len(), 3 + 4);
        assert!(requests[..3].iter().all(|r| r == &requests[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_exhausted_retries_fail_whole_letter() {
        let llm = Arc::new(ScriptedGenerator::scripted(vec![
            Err(unavailable()),
            Err(unavailable()),
            Err(unavailable()),
        ]));

        let result = offline_pipeline(llm.clone())
            .generate_letter(&sample_bundle())
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Generation(GenerationError::Backend {
                section: SectionKind::Intro,
                source: LlmError::Unavailable { .. },
            }))
        ));
        assert_eq!(llm.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_company_page_grounds_alignment() {
        let llm = Arc::new(ScriptedGenerator::echoing());
        let pipeline = pipeline_with(
            llm.clone(),
            Arc::new(FakePages::html(
                "<p>Acme Corporation was founded in 1999. Our mission is to delight builders. \
                 We sell hammers.</p>",
            )),
            Arc::new(FakeLauncher::timing_out()),
        );
        let mut bundle = sample_bundle();
        bundle.company_url = Some("acme.test".to_string());

        pipeline.generate_letter(&bundle).await.unwrap();

        let requests = llm.requests();
        let prompt = &requests.last().unwrap().user_prompt;
        assert!(prompt.contains(
            "Company material: Acme Corporation was founded in 1999 \
             Our mission is to delight builders We sell hammers"
        ));
    }

    #[tokio::test]
    async fn test_unreachable_company_site_degrades_to_generic() {
        let llm = Arc::new(ScriptedGenerator::echoing());
        let launcher = Arc::new(FakeLauncher::timing_out());
        let pipeline = pipeline_with(llm.clone(), Arc::new(FakePages::failing()), launcher.clone());
        let mut bundle = sample_bundle();
        bundle.company_url = Some("https://down.test".to_string());

        let sections = pipeline.generate_letter(&bundle).await.unwrap();

        assert!(!sections.company_alignment.is_empty());
        assert_eq!(launcher.closes(), 1);
        assert!(llm
            .requests()
            .last()
            .unwrap()
            .user_prompt
            .contains("no specific information"));
    }

    #[tokio::test]
    async fn test_concurrent_schedule_produces_all_sections() {
        let llm = Arc::new(ScriptedGenerator::echoing());

        let sections = offline_pipeline(llm.clone())
            .with_schedule(SectionSchedule::Concurrent)
            .generate_letter(&sample_bundle())
            .await
            .unwrap();

        assert_eq!(sections.intro, "Paragraph for Intro.");
        assert_eq!(sections.tailored_experience, "Paragraph for Experience.");
        assert_eq!(sections.company_alignment, "Paragraph for Alignment.");
        assert_eq!(llm.requests().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_slow_generation() {
        let llm = Arc::new(ScriptedGenerator::echoing().with_latency(Duration::from_secs(60)));

        let result = offline_pipeline(llm)
            .with_deadline(Duration::from_secs(90))
            .generate_letter(&sample_bundle())
            .await;

        assert!(matches!(result, Err(PipelineError::DeadlineExceeded(_))));
    }
}
