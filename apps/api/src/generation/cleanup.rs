//! Post-processing of raw model output into letter-ready prose.
//!
//! Greetings and sign-offs are added once by document assembly, so both are
//! stripped from every generated paragraph here.

/// Phrase lists driving `clean_response_text`. Extend the data, not the logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRules {
    pub salutations: Vec<String>,
    pub closings: Vec<String>,
}

const DEFAULT_SALUTATIONS: &[&str] = &[
    "Dear Hiring Manager,",
    "To whom it may concern,",
    "Hello,",
    "Hi,",
    "Greetings,",
    "Hiring Manager,",
    "Dear [Hiring Manager's Name],",
];

const DEFAULT_CLOSINGS: &[&str] = &[
    "Sincerely",
    "Best regards",
    "Warm regards",
    "Kind regards",
    "Thank you",
    "Cheers",
    "Yours truly",
    "Yours sincerely",
    "Yours faithfully",
    "Regards",
    "Best",
    "In conclusion",
    "In summary",
];

impl Default for CleanupRules {
    fn default() -> Self {
        Self {
            salutations: DEFAULT_SALUTATIONS.iter().map(|s| s.to_string()).collect(),
            closings: DEFAULT_CLOSINGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CleanupRules {
    /// Replaces every salutation with a blank line, then cuts the text at each
    /// closing phrase present, dropping the closing and everything after it.
    pub fn clean_response_text(&self, response: &str) -> String {
        let mut text = response.trim().to_string();

        for salutation in &self.salutations {
            if text.contains(salutation.as_str()) {
                text = text.replace(salutation.as_str(), "\n\n").trim().to_string();
            }
        }

        for closing in &self.closings {
            if let Some(idx) = text.find(closing.as_str()) {
                text = text[..idx].trim_end().to_string();
            }
        }

        text
    }
}

/// Drops an accidental greeting lead-in ("Dear team, ...") from a draft.
///
/// Only the first line is inspected: if it contains a comma, everything up to
/// and including that comma is removed.
pub fn strip_leading_clause(text: &str) -> String {
    let text = text.trim();
    let first_line_end = text.find('\n').unwrap_or(text.len());

    match text[..first_line_end].find(',') {
        Some(comma) => text[comma + 1..].trim().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salutation_removed() {
        let rules = CleanupRules::default();
        assert_eq!(
            rules.clean_response_text("Dear Hiring Manager,\nI build bridges."),
            "I build bridges."
        );
    }

    #[test]
    fn test_closing_truncates_rest() {
        let rules = CleanupRules::default();
        let text = "I would love to join Acme.\n\nSincerely,\nAna";
        assert_eq!(rules.clean_response_text(text), "I would love to join Acme.");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let rules = CleanupRules::default();
        let text = "Paragraph one. Kind regards, Ana. Sincerely again";
        assert_eq!(rules.clean_response_text(text), "Paragraph one.");
    }

    #[test]
    fn test_text_without_boilerplate_unchanged() {
        let rules = CleanupRules::default();
        let text = "I led three projects to completion.\n\nEach shipped on time.";
        assert_eq!(rules.clean_response_text(text), text);
    }

    #[test]
    fn test_closing_match_is_case_sensitive() {
        let rules = CleanupRules::default();
        let text = "My regards to the team for their work.";
        assert_eq!(rules.clean_response_text(text), text);
    }

    #[test]
    fn test_custom_rules_apply() {
        let rules = CleanupRules {
            salutations: vec!["Yo,".to_string()],
            closings: vec!["Later".to_string()],
        };
        assert_eq!(rules.clean_response_text("Yo, hire me. Later, Ana"), "hire me.");
    }

    #[test]
    fn test_strip_leading_clause_on_greeting() {
        assert_eq!(
            strip_leading_clause("Dear Acme team,\nI am a builder."),
            "I am a builder."
        );
    }

    #[test]
    fn test_strip_leading_clause_only_checks_first_line() {
        let text = "I am a builder\nwho loves tools, nails and wood.";
        assert_eq!(strip_leading_clause(text), text);
    }
}
