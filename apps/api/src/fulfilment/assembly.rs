//! Document assembly: the one place greeting and sign-off are written.

use serde::Serialize;

use crate::models::letter::{LetterInputs, LetterSections};

const CONTACT_PLACEHOLDERS: &[&str] = &["[CITY STATE ZIP]", "[PHONE] | [EMAIL]"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetterDocument {
    pub title: String,
    pub filename: String,
    pub body: String,
}

impl LetterDocument {
    pub fn assemble(inputs: &LetterInputs, sections: &LetterSections) -> Self {
        let title = format!("{} at {}", inputs.role, inputs.company);

        let mut blocks: Vec<String> = Vec::with_capacity(8);
        blocks.push(
            std::iter::once(inputs.name.as_str())
                .chain(CONTACT_PLACEHOLDERS.iter().copied())
                .collect::<Vec<_>>()
                .join("\n"),
        );
        blocks.push(format!("Dear Hiring Manager at {},", inputs.company));
        blocks.push(sections.intro.trim().to_string());
        blocks.push(sections.tailored_experience.trim().to_string());
        blocks.push(sections.company_alignment.trim().to_string());
        blocks.push(format!("Sincerely,\n{}", inputs.name));

        Self {
            filename: format!("{}.txt", file_safe(&title)),
            title,
            body: blocks.join("\n\n") + "\n",
        }
    }
}

fn file_safe(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_inputs;

    fn sections() -> LetterSections {
        LetterSections {
            intro: "Intro paragraph.".to_string(),
            tailored_experience: "Experience one.\n\nExperience two.".to_string(),
            company_alignment: "Alignment paragraph.".to_string(),
        }
    }

    #[test]
    fn test_layout_order() {
        let doc = LetterDocument::assemble(&sample_inputs(), &sections());
        let greeting = doc.body.find("Dear Hiring Manager at Acme,").unwrap();
        let intro = doc.body.find("Intro paragraph.").unwrap();
        let experience = doc.body.find("Experience two.").unwrap();
        let alignment = doc.body.find("Alignment paragraph.").unwrap();
        let closing = doc.body.find("Sincerely,\nAna").unwrap();
        assert!(greeting < intro && intro < experience && experience < alignment);
        assert!(alignment < closing);
        assert!(doc.body.starts_with("Ana\n[CITY STATE ZIP]"));
    }

    #[test]
    fn test_greeting_and_closing_appear_once() {
        let doc = LetterDocument::assemble(&sample_inputs(), &sections());
        assert_eq!(doc.body.matches("Dear Hiring Manager").count(), 1);
        assert_eq!(doc.body.matches("Sincerely").count(), 1);
    }

    #[test]
    fn test_title_and_filename() {
        let mut inputs = sample_inputs();
        inputs.company = "Acme/Widgets".to_string();
        let doc = LetterDocument::assemble(&inputs, &sections());
        assert_eq!(doc.title, "Engineer at Acme/Widgets");
        assert_eq!(doc.filename, "Engineer at Acme-Widgets.txt");
    }
}
