//! Relevance Extractor: picks the sentences of a company page most likely to
//! describe who the company is and what it stands for.
//!
//! Pure and deterministic: score = keyword hits + ORG/DATE entity count,
//! ranked by score descending then length ascending (stable on ties).

use std::sync::Arc;

pub mod entities;

pub use entities::{EntityLabel, EntityRecognizer, RuleBasedRecognizer};

/// Phrases that tend to appear in "about us" style copy.
pub const RELEVANCE_KEYWORDS: &[&str] = &[
    "about",
    "mission",
    "vision",
    "history",
    "company",
    "founded",
    "established",
    "believe",
    "our goal",
    "we aim",
    "we strive",
];

/// Number of sentences kept in the excerpt.
pub const TOP_SENTENCES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSentence {
    pub text: String,
    pub keyword_score: usize,
    pub entity_score: usize,
}

impl ScoredSentence {
    pub fn total_score(&self) -> usize {
        self.keyword_score + self.entity_score
    }
}

#[derive(Clone)]
pub struct RelevanceExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    keywords: Vec<String>,
    top_n: usize,
}

impl RelevanceExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            recognizer,
            keywords: RELEVANCE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            top_n: TOP_SENTENCES,
        }
    }

    /// Top-ranked sentences joined with single spaces, in ranked order.
    /// Empty input gives an empty excerpt.
    pub fn extract_relevant(&self, text: &str) -> String {
        self.rank(text)
            .into_iter()
            .take(self.top_n)
            .map(|s| s.text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Every candidate sentence, best first.
    pub fn rank(&self, text: &str) -> Vec<ScoredSentence> {
        let mut scored: Vec<ScoredSentence> = split_sentences(text)
            .into_iter()
            .map(|sentence| self.score(sentence))
            .collect();

        scored.sort_by(|a, b| {
            b.total_score()
                .cmp(&a.total_score())
                .then_with(|| a.text.chars().count().cmp(&b.text.chars().count()))
        });
        scored
    }

    pub fn score(&self, sentence: &str) -> ScoredSentence {
        let lowered = sentence.to_lowercase();
        let keyword_score = self
            .keywords
            .iter()
            .map(|k| lowered.matches(k.as_str()).count())
            .sum();

        let entity_score = self
            .recognizer
            .entities(sentence)
            .iter()
            .filter(|e| matches!(e.label, EntityLabel::Organization | EntityLabel::Date))
            .count();

        ScoredSentence {
            text: sentence.to_string(),
            keyword_score,
            entity_score,
        }
    }
}

/// Period-delimited candidates, trimmed, empties dropped.
fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
