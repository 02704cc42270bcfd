//! Language Gate: decides whether bullet points need translating before they
//! reach English-language prompts, and performs the translation when they do.
//!
//! The gate is biased toward translating: only a confident English detection
//! skips the translation call. Ambiguous or short input is translated.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use whatlang::Lang;

pub mod deepl;

pub use deepl::{DeeplTranslator, TranslationError, Translator};

/// Default target language code for translation.
pub const TARGET_LANGUAGE: &str = "EN";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectionError {
    #[error("no language could be detected")]
    Undetermined,

    #[error("detected {0:?} with low confidence")]
    Unreliable(Lang),
}

/// Identifies the language of a piece of text.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<Lang, DetectionError>;
}

/// Trigram-based detector backed by `whatlang`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<Lang, DetectionError> {
        let info = whatlang::detect(text).ok_or(DetectionError::Undetermined)?;
        if !info.is_reliable() {
            return Err(DetectionError::Unreliable(info.lang()));
        }
        Ok(info.lang())
    }
}

#[derive(Clone)]
pub struct LanguageGate {
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
}

impl LanguageGate {
    pub fn new(detector: Arc<dyn LanguageDetector>, translator: Arc<dyn Translator>) -> Self {
        Self {
            detector,
            translator,
        }
    }

    /// True unless the detector is confident the text is already English.
    pub fn should_translate(&self, text: &str) -> bool {
        match self.detector.detect(text) {
            Ok(Lang::Eng) => false,
            Ok(lang) => {
                debug!("Detected {:?}, translation required", lang);
                true
            }
            Err(e) => {
                debug!("Language detection failed ({e}), translating to be safe");
                true
            }
        }
    }

    /// Returns `text` in the target language.
    ///
    /// Confident English input comes back untouched without a backend call.
    /// A translation failure is returned to the caller, who decides whether
    /// the original text is good enough.
    pub async fn normalize(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if !self.should_translate(text) {
            return Ok(text.to_string());
        }

        let translated = self.translator.translate(text, target_language).await?;
        info!(
            "Translated {} chars of input to {}",
            text.chars().count(),
            target_language
        );
        Ok(translated)
    }
}
