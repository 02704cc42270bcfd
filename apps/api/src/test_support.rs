//! Scripted stand-ins for every external collaborator, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use whatlang::Lang;

use crate::extraction::{RelevanceExtractor, RuleBasedRecognizer};
use crate::fetch::{BrowserLauncher, BrowserSession, FetchError, PageSource, WebContentFetcher};
use crate::fulfilment::delivery::{DeliveryError, LetterDelivery};
use crate::fulfilment::assembly::LetterDocument;
use crate::fulfilment::quota::{QuotaError, QuotaLedger, UsageSnapshot};
use crate::generation::pipeline::LetterPipeline;
use crate::generation::sections::SectionWriter;
use crate::language::{
    DetectionError, LanguageDetector, LanguageGate, TranslationError, Translator,
};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::letter::{GenerationRequest, LetterInputs, RawInputBundle};

pub fn sample_bundle() -> RawInputBundle {
    RawInputBundle {
        name: Some("Ana".to_string()),
        email: Some("ana@example.com".to_string()),
        role: Some("Engineer".to_string()),
        company: Some("Acme".to_string()),
        company_url: None,
        intro_points: Some("5 years experience.".to_string()),
        tailored_experience_points: Some("Led 3 projects.".to_string()),
        agree_promo: false,
    }
}

pub fn sample_inputs() -> LetterInputs {
    sample_bundle()
        .validate()
        .expect("sample bundle is complete")
}

pub fn unavailable() -> LlmError {
    LlmError::Unavailable {
        message: "service unavailable".to_string(),
    }
}

/// A gate that always sees English and so never translates.
pub fn english_gate() -> LanguageGate {
    LanguageGate::new(
        Arc::new(FixedDetector(Ok(Lang::Eng))),
        Arc::new(RecordingTranslator::failing()),
    )
}

pub fn pipeline_with(
    llm: Arc<ScriptedGenerator>,
    pages: Arc<FakePages>,
    launcher: Arc<FakeLauncher>,
) -> LetterPipeline {
    LetterPipeline::new(
        SectionWriter::new(llm, english_gate()),
        WebContentFetcher::new(pages, launcher),
        RelevanceExtractor::new(Arc::new(RuleBasedRecognizer::new())),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Generation backend
// ────────────────────────────────────────────────────────────────────────────

/// Replays scripted results in order, then answers `Paragraph for <Section>.`
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    latency: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn scripted(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    pub fn replying(replies: Vec<&str>) -> Self {
        Self::scripted(replies.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn echoing() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(format!("Paragraph for {:?}.", request.section_kind)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Language
// ────────────────────────────────────────────────────────────────────────────

pub struct FixedDetector(pub Result<Lang, DetectionError>);

impl LanguageDetector for FixedDetector {
    fn detect(&self, _text: &str) -> Result<Lang, DetectionError> {
        self.0.clone()
    }
}

pub struct RecordingTranslator {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl RecordingTranslator {
    pub fn succeeding(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(
        &self,
        _text: &str,
        _target_language: &str,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(TranslationError::EmptyResponse)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fetching
// ────────────────────────────────────────────────────────────────────────────

pub struct FakePages {
    html: Option<String>,
    calls: AtomicUsize,
}

impl FakePages {
    pub fn html(html: &str) -> Self {
        Self {
            html: Some(html.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            html: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for FakePages {
    async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.html.clone().ok_or_else(|| FetchError::Status {
            status: 403,
            url: url.to_string(),
        })
    }
}

#[derive(Clone)]
enum RenderMode {
    Paragraphs(Vec<String>),
    TimesOut,
    Unlaunchable,
    /// Navigation blocks the thread for this long, then renders nothing.
    SlowNavigation(Duration),
    Panics,
}

pub struct FakeLauncher {
    mode: RenderMode,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl FakeLauncher {
    fn with_mode(mode: RenderMode) -> Self {
        Self {
            mode,
            launches: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn rendering(paragraphs: Vec<String>) -> Self {
        Self::with_mode(RenderMode::Paragraphs(paragraphs))
    }

    /// Launches, but the paragraph wait never succeeds.
    pub fn timing_out() -> Self {
        Self::with_mode(RenderMode::TimesOut)
    }

    pub fn unlaunchable() -> Self {
        Self::with_mode(RenderMode::Unlaunchable)
    }

    pub fn slow_navigation(delay: Duration) -> Self {
        Self::with_mode(RenderMode::SlowNavigation(delay))
    }

    /// The session panics while collecting paragraph text.
    pub fn panicking() -> Self {
        Self::with_mode(RenderMode::Panics)
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl BrowserLauncher for FakeLauncher {
    fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if matches!(self.mode, RenderMode::Unlaunchable) {
            return Err(FetchError::Browser("chrome not found".to_string()));
        }
        Ok(Box::new(FakeSession {
            mode: self.mode.clone(),
            closes: self.closes.clone(),
        }))
    }
}

struct FakeSession {
    mode: RenderMode,
    closes: Arc<AtomicUsize>,
}

impl BrowserSession for FakeSession {
    fn navigate(&mut self, _url: &str, _timeout: Duration) -> Result<(), FetchError> {
        if let RenderMode::SlowNavigation(delay) = self.mode {
            std::thread::sleep(delay);
        }
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), FetchError> {
        match self.mode {
            RenderMode::Paragraphs(_) | RenderMode::Panics => Ok(()),
            _ => Err(FetchError::Browser(format!(
                "no '{selector}' element within {}s",
                timeout.as_secs()
            ))),
        }
    }

    fn element_texts(&mut self, _selector: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        match &self.mode {
            RenderMode::Paragraphs(p) => Ok(p.iter().take(limit).cloned().collect()),
            RenderMode::Panics => panic!("renderer crashed"),
            _ => Ok(Vec::new()),
        }
    }

    fn close(self: Box<Self>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fulfilment
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryQuotaLedger {
    usage: Mutex<HashMap<String, UsageSnapshot>>,
}

impl InMemoryQuotaLedger {
    pub fn with_usage(email: &str, num_letters: u32) -> Self {
        let ledger = Self::default();
        ledger.usage.lock().unwrap().insert(
            email.to_string(),
            UsageSnapshot {
                num_letters,
                agree_promo: false,
            },
        );
        ledger
    }

    pub fn letters_for(&self, email: &str) -> u32 {
        self.usage
            .lock()
            .unwrap()
            .get(email)
            .map(|u| u.num_letters)
            .unwrap_or(0)
    }
}

#[async_trait]
impl QuotaLedger for InMemoryQuotaLedger {
    async fn usage(&self, email: &str) -> Result<Option<UsageSnapshot>, QuotaError> {
        Ok(self.usage.lock().unwrap().get(email).cloned())
    }

    async fn record_letter(
        &self,
        email: &str,
        _name: &str,
        agree_promo: bool,
    ) -> Result<u32, QuotaError> {
        let mut usage = self.usage.lock().unwrap();
        let entry = usage.entry(email.to_string()).or_insert(UsageSnapshot {
            num_letters: 0,
            agree_promo,
        });
        entry.num_letters += 1;
        entry.agree_promo = agree_promo;
        Ok(entry.num_letters)
    }
}

#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<(String, LetterDocument)>>,
    fail: bool,
}

impl RecordingDelivery {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, LetterDocument)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl LetterDelivery for RecordingDelivery {
    async fn deliver(&self, recipient: &str, document: &LetterDocument) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected {
                status: 500,
                message: "mail server down".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), document.clone()));
        Ok(())
    }
}
