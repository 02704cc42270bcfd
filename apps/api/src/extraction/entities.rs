//! Named-entity recognition for relevance scoring.
//!
//! Only ORGANIZATION and DATE matter to the extractor. The default recognizer
//! is rule-based; anything implementing `EntityRecognizer` can replace it.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Organization,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

pub trait EntityRecognizer: Send + Sync {
    fn entities(&self, text: &str) -> Vec<Entity>;
}

static ORG_WITH_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:[A-Z][\w&'-]*\s+){1,4}(?:Inc|Corp|Corporation|Company|Co|LLC|Ltd|Limited|GmbH|Group|Holdings|Foundation|Institute|University|Technologies|Labs|Systems|Partners|Bank)\b",
    )
    .expect("organization pattern is valid")
});

static ACRONYM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,6}\b").expect("acronym pattern is valid"));

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \b(?:January|February|March|April|May|June|July|August|September|October|November|December)
            (?:\s+\d{1,2}(?:st|nd|rd|th)?)?(?:,?\s+\d{4})?\b
        | \b(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\b
        | \b(?:the\s+)?(?:1[6-9]|20)\d0s\b
        | \b(?:1[6-9]|20)\d{2}\b
        | \b\d+\s+(?:years?|months?|weeks?|days?|decades?)\b
        | \b(?:today|yesterday|tomorrow)\b
        ",
    )
    .expect("date pattern is valid")
});

/// Words that look like acronyms but are not organizations.
const ACRONYM_STOPLIST: &[&str] = &["AM", "PM", "OK", "US", "USA", "UK", "EU", "FAQ", "CEO"];

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedRecognizer;

impl RuleBasedRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl EntityRecognizer for RuleBasedRecognizer {
    fn entities(&self, text: &str) -> Vec<Entity> {
        let mut found = Vec::new();
        let mut org_spans: Vec<(usize, usize)> = Vec::new();

        for m in ORG_WITH_SUFFIX.find_iter(text) {
            org_spans.push((m.start(), m.end()));
            found.push(Entity {
                text: m.as_str().to_string(),
                label: EntityLabel::Organization,
            });
        }

        for m in ACRONYM.find_iter(text) {
            let inside_org = org_spans
                .iter()
                .any(|&(start, end)| m.start() >= start && m.end() <= end);
            if inside_org || ACRONYM_STOPLIST.contains(&m.as_str()) {
                continue;
            }
            found.push(Entity {
                text: m.as_str().to_string(),
                label: EntityLabel::Organization,
            });
        }

        found.extend(DATE.find_iter(text).map(|m| Entity {
            text: m.as_str().to_string(),
            label: EntityLabel::Date,
        }));

        found
    }
}
